//! Pipeline configuration sections.
//!
//! Each struct maps to one TOML table and fills missing fields with defaults,
//! so an empty table is always valid.

use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use storyreel_error::ConfigError;
use storyreel_rate_limit::RetryConfig;

/// `[segmentation]`: how story text is split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SegmenterConfig {
    /// Character budget per segment
    #[serde(default = "default_max_segment_length")]
    pub max_segment_length: usize,

    /// Sentences of this many characters or fewer are dropped
    #[serde(default = "default_min_unit_length")]
    pub min_unit_length: usize,
}

fn default_max_segment_length() -> usize {
    150
}

fn default_min_unit_length() -> usize {
    10
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            max_segment_length: default_max_segment_length(),
            min_unit_length: default_min_unit_length(),
        }
    }
}

/// `[duration]`: reading-speed model for segment playback time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DurationConfig {
    /// Narration speed
    #[serde(default = "default_words_per_minute")]
    pub words_per_minute: f64,

    /// Seconds added to every segment for visuals and transitions
    #[serde(default = "default_buffer_seconds")]
    pub buffer_seconds: f64,

    /// Lower bound for any segment
    #[serde(default = "default_minimum_seconds")]
    pub minimum_seconds: f64,

    /// Round to whole seconds before applying the minimum
    #[serde(default = "default_round")]
    pub round_to_whole_seconds: bool,
}

fn default_words_per_minute() -> f64 {
    200.0
}

fn default_buffer_seconds() -> f64 {
    2.0
}

fn default_minimum_seconds() -> f64 {
    3.0
}

fn default_round() -> bool {
    true
}

impl Default for DurationConfig {
    fn default() -> Self {
        Self {
            words_per_minute: default_words_per_minute(),
            buffer_seconds: default_buffer_seconds(),
            minimum_seconds: default_minimum_seconds(),
            round_to_whole_seconds: default_round(),
        }
    }
}

/// `[generation]`: per-segment media synthesis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationConfig {
    /// Segments generated at the same time
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Deadline for a single provider call
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Visual prompt; `{text}` is replaced by the segment text
    #[serde(default = "default_visual_prompt_template")]
    pub visual_prompt_template: String,

    /// Whether narration is synthesized
    #[serde(default = "default_audio_enabled")]
    pub audio_enabled: bool,

    /// Retries of a transient provider failure
    #[serde(default)]
    pub max_retries: usize,

    /// Base of the retry backoff, in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound of a single retry delay, in seconds
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

fn default_max_concurrent() -> usize {
    4
}

fn default_timeout_secs() -> u64 {
    120
}

fn default_visual_prompt_template() -> String {
    "A cinematic storybook illustration of the following scene: {text}".to_string()
}

fn default_audio_enabled() -> bool {
    true
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_secs() -> u64 {
    30
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            timeout_secs: default_timeout_secs(),
            visual_prompt_template: default_visual_prompt_template(),
            audio_enabled: default_audio_enabled(),
            max_retries: 0,
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

impl GenerationConfig {
    /// Provider call deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Retry policy handed to the provider rate limiters.
    pub fn retry_config(&self) -> RetryConfig {
        RetryConfig {
            max_retries: self.max_retries,
            initial_backoff_ms: self.initial_backoff_ms,
            max_backoff_secs: self.max_backoff_secs,
        }
    }

    /// Build the visual prompt for a segment.
    pub fn visual_prompt(&self, text: &str) -> String {
        if self.visual_prompt_template.contains("{text}") {
            self.visual_prompt_template.replace("{text}", text)
        } else {
            format!("{} {}", self.visual_prompt_template, text)
        }
    }
}

/// Which assembler produces the artifact.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum AssemblyBackend {
    /// JSON timeline in media storage
    #[default]
    Manifest,
    /// MP4 rendered with ffmpeg
    Ffmpeg,
}

/// Output quality preset.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum VideoQuality {
    /// 480p, CRF 28
    Low,
    /// 720p, CRF 23
    #[default]
    Medium,
    /// 1080p, CRF 18
    High,
}

impl VideoQuality {
    /// x264 constant rate factor.
    pub fn crf(&self) -> u8 {
        match self {
            VideoQuality::Low => 28,
            VideoQuality::Medium => 23,
            VideoQuality::High => 18,
        }
    }

    /// Output frame size as `(width, height)`.
    pub fn resolution(&self) -> (u32, u32) {
        match self {
            VideoQuality::Low => (854, 480),
            VideoQuality::Medium => (1280, 720),
            VideoQuality::High => (1920, 1080),
        }
    }
}

/// `[assembly]`: how generated segments become one artifact.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssemblyConfig {
    /// Assembler implementation
    #[serde(default)]
    pub backend: AssemblyBackend,

    /// Output quality preset
    #[serde(default)]
    pub quality: VideoQuality,

    /// Whether segment text is carried as captions
    #[serde(default = "default_subtitles_enabled")]
    pub subtitles_enabled: bool,

    /// Length of the fade between adjacent segments
    #[serde(default = "default_transition_seconds")]
    pub transition_seconds: f64,

    /// Deadline for the whole assembly step
    #[serde(default = "default_assembly_timeout_secs")]
    pub timeout_secs: u64,

    /// ffmpeg binary; looked up on `PATH` when unset
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,
}

fn default_subtitles_enabled() -> bool {
    true
}

fn default_transition_seconds() -> f64 {
    0.5
}

fn default_assembly_timeout_secs() -> u64 {
    600
}

impl Default for AssemblyConfig {
    fn default() -> Self {
        Self {
            backend: AssemblyBackend::default(),
            quality: VideoQuality::default(),
            subtitles_enabled: default_subtitles_enabled(),
            transition_seconds: default_transition_seconds(),
            timeout_secs: default_assembly_timeout_secs(),
            ffmpeg_path: None,
        }
    }
}

impl AssemblyConfig {
    /// Assembly deadline.
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// All pipeline sections together.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// `[segmentation]`
    #[serde(default)]
    pub segmentation: SegmenterConfig,

    /// `[duration]`
    #[serde(default)]
    pub duration: DurationConfig,

    /// `[generation]`
    #[serde(default)]
    pub generation: GenerationConfig,

    /// `[assembly]`
    #[serde(default)]
    pub assembly: AssemblyConfig,
}

impl PipelineConfig {
    /// Check values the types alone cannot rule out.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` naming the first invalid field.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.segmentation.max_segment_length == 0 {
            return Err(ConfigError::new(
                "segmentation.max_segment_length must be at least 1",
            ));
        }
        if self.duration.words_per_minute <= 0.0 {
            return Err(ConfigError::new(
                "duration.words_per_minute must be positive",
            ));
        }
        if self.duration.buffer_seconds < 0.0 || self.duration.minimum_seconds < 0.0 {
            return Err(ConfigError::new(
                "duration.buffer_seconds and duration.minimum_seconds must not be negative",
            ));
        }
        if self.generation.max_concurrent == 0 {
            return Err(ConfigError::new(
                "generation.max_concurrent must be at least 1",
            ));
        }
        if self.generation.timeout_secs == 0 || self.assembly.timeout_secs == 0 {
            return Err(ConfigError::new("timeouts must be at least 1 second"));
        }
        if self.assembly.transition_seconds < 0.0 {
            return Err(ConfigError::new(
                "assembly.transition_seconds must not be negative",
            ));
        }
        Ok(())
    }
}
