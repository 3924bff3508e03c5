//! Splitting story text into ordered, bounded segments.

use storyreel_error::{PipelineError, PipelineResult};
use tracing::debug;

use crate::SegmenterConfig;

const SEPARATOR: &str = ". ";

fn is_terminator(c: char) -> bool {
    matches!(c, '.' | '!' | '?')
}

/// Greedy sentence packer.
///
/// Sentences are the pieces between runs of `.`, `!` and `?`. Sentences no
/// longer than `min_unit_length` characters are dropped; the rest are joined
/// with `". "` into segments of at most `max_segment_length` characters. A
/// sentence longer than the budget becomes a segment of its own and is never
/// cut. Lengths count Unicode scalar values.
///
/// # Examples
///
/// ```
/// use storyreel_assembly::{Segmenter, SegmenterConfig};
///
/// let segmenter = Segmenter::new(SegmenterConfig {
///     max_segment_length: 40,
///     min_unit_length: 10,
/// });
/// let segments = segmenter
///     .segment("A dragon wants friends. It flies over the village. The villagers wave back.")
///     .unwrap();
/// assert_eq!(
///     segments,
///     vec![
///         "A dragon wants friends",
///         "It flies over the village",
///         "The villagers wave back",
///     ]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct Segmenter {
    config: SegmenterConfig,
}

impl Segmenter {
    /// Create a segmenter.
    pub fn new(config: SegmenterConfig) -> Self {
        Self { config }
    }

    /// The active configuration.
    pub fn config(&self) -> &SegmenterConfig {
        &self.config
    }

    /// Segment with the configured budget.
    ///
    /// # Errors
    ///
    /// `InvalidInput` when the text is blank, the budget is zero, or no
    /// sentence is longer than the minimum length.
    #[track_caller]
    pub fn segment(&self, story_text: &str) -> PipelineResult<Vec<String>> {
        self.segment_with_budget(story_text, self.config.max_segment_length)
    }

    /// Segment with an explicit character budget.
    ///
    /// # Errors
    ///
    /// See [`segment`](Self::segment).
    #[track_caller]
    pub fn segment_with_budget(
        &self,
        story_text: &str,
        max_segment_length: usize,
    ) -> PipelineResult<Vec<String>> {
        let text = story_text.trim();
        if text.is_empty() {
            return Err(PipelineError::invalid_input("story text is empty"));
        }
        if max_segment_length == 0 {
            return Err(PipelineError::invalid_input(
                "maximum segment length must be at least 1",
            ));
        }

        // Unpunctuated text is one segment, whatever its length.
        if !text.contains(is_terminator) {
            return Ok(vec![text.to_string()]);
        }

        let units: Vec<&str> = text
            .split(is_terminator)
            .map(str::trim)
            .filter(|unit| unit.chars().count() > self.config.min_unit_length)
            .collect();

        if units.is_empty() {
            return Err(PipelineError::invalid_input(format!(
                "no sentence is longer than {} characters",
                self.config.min_unit_length
            )));
        }

        let separator_len = SEPARATOR.chars().count();
        let mut segments = Vec::new();
        let mut current = String::new();
        let mut current_len = 0usize;

        for unit in units {
            let unit_len = unit.chars().count();
            if current_len > 0 && current_len + unit_len + separator_len > max_segment_length {
                segments.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push_str(SEPARATOR);
                current_len += separator_len;
            }
            current.push_str(unit);
            current_len += unit_len;
        }
        if current_len > 0 {
            segments.push(current);
        }

        debug!(
            segments = segments.len(),
            max_segment_length, "Segmented story text"
        );
        Ok(segments)
    }
}

/// Segment `story_text` with the default minimum sentence length.
///
/// # Errors
///
/// See [`Segmenter::segment`].
#[track_caller]
pub fn segment_story(story_text: &str, max_segment_length: usize) -> PipelineResult<Vec<String>> {
    Segmenter::default().segment_with_budget(story_text, max_segment_length)
}
