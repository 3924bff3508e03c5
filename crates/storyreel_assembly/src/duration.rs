//! Playback duration estimation.

use crate::DurationConfig;

/// Estimates segment playback time from its word count.
///
/// `words / words_per_minute * 60 + buffer`, rounded to whole seconds when
/// configured, never below the minimum. Monotone in the word count.
///
/// # Examples
///
/// ```
/// use storyreel_assembly::DurationEstimator;
///
/// let estimator = DurationEstimator::default();
/// assert_eq!(estimator.estimate("A dragon wants friends"), 3.0);
/// assert_eq!(estimator.estimate(&"word ".repeat(200)), 62.0);
/// ```
#[derive(Debug, Clone, Default)]
pub struct DurationEstimator {
    config: DurationConfig,
}

impl DurationEstimator {
    /// Create an estimator.
    pub fn new(config: DurationConfig) -> Self {
        Self { config }
    }

    /// Estimated seconds of playback for `segment_text`.
    pub fn estimate(&self, segment_text: &str) -> f64 {
        let words = segment_text.split_whitespace().count() as f64;
        let mut seconds = words / self.config.words_per_minute * 60.0 + self.config.buffer_seconds;
        if self.config.round_to_whole_seconds {
            seconds = seconds.round();
        }
        seconds.max(self.config.minimum_seconds)
    }
}

/// Estimate with the default reading-speed model.
pub fn estimate_duration(segment_text: &str) -> f64 {
    DurationEstimator::default().estimate(segment_text)
}
