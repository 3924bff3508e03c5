//! `storyreel segment`.

use std::path::Path;

use serde::Serialize;
use storyreel::{DurationEstimator, Segmenter, StoryreelConfig};
use tracing::info;

#[derive(Debug, Serialize)]
struct SegmentPreview {
    sequence_index: usize,
    text: String,
    duration_seconds: f64,
}

/// Segment a story file and print the segments as JSON.
pub async fn segment_file(
    config: &StoryreelConfig,
    path: &Path,
    max_length: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let story = super::read_story(path).await?;
    let segmenter = Segmenter::new(config.segmentation.clone());
    let estimator = DurationEstimator::new(config.duration.clone());

    let budget = max_length.unwrap_or(config.segmentation.max_segment_length);
    let previews: Vec<SegmentPreview> = segmenter
        .segment_with_budget(&story, budget)?
        .into_iter()
        .enumerate()
        .map(|(sequence_index, text)| SegmentPreview {
            sequence_index,
            duration_seconds: estimator.estimate(&text),
            text,
        })
        .collect();

    info!(segments = previews.len(), budget, "Segmented story");
    println!("{}", serde_json::to_string_pretty(&previews)?);
    Ok(())
}
