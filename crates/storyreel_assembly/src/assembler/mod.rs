//! Assembly backends and their shared precondition check.

mod ffmpeg;
mod manifest;

pub use ffmpeg::FfmpegAssembler;
pub use manifest::ManifestAssembler;

use std::collections::BTreeSet;

use storyreel_core::{Segment, SegmentMedia};
use storyreel_error::{PipelineError, PipelineErrorKind, PipelineResult};

/// Check that `segments` can be assembled and return their media in order.
///
/// The sequence orders must be exactly `0..n` and every segment must carry a
/// media reference and a duration. An empty set is incomplete too.
///
/// # Errors
///
/// `IncompleteInput` listing every offending sequence index: missing or
/// duplicated positions and segments without media.
pub fn validate_assembly_input(segments: &[Segment]) -> PipelineResult<Vec<SegmentMedia>> {
    let mut ordered: Vec<&Segment> = segments.iter().collect();
    ordered.sort_by_key(|s| *s.sequence_order());

    let mut offending = BTreeSet::new();
    let mut seen = BTreeSet::new();
    for segment in &ordered {
        let order = *segment.sequence_order();
        if !seen.insert(order) || order >= ordered.len() {
            offending.insert(order);
        }
        if !segment.has_media() || segment.duration_seconds().is_none() {
            offending.insert(order);
        }
    }
    offending.extend((0..ordered.len()).filter(|i| !seen.contains(i)));

    if segments.is_empty() || !offending.is_empty() {
        return Err(PipelineError::new(PipelineErrorKind::IncompleteInput {
            sequence_indices: offending.into_iter().collect(),
        }));
    }

    ordered
        .into_iter()
        .map(SegmentMedia::try_from)
        .collect()
}
