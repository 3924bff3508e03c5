//! Layered TOML configuration.
//!
//! Sources, later overriding earlier:
//! - Bundled defaults (include_str! from storyreel.toml)
//! - `~/.config/storyreel/storyreel.toml`
//! - `./storyreel.toml`

use std::path::{Path, PathBuf};

use config::{Config, File, FileFormat};
use serde::{Deserialize, Serialize};
use storyreel_assembly::{
    AssemblyBackend, AssemblyConfig, DurationConfig, GenerationConfig, PipelineConfig, SegmenterConfig,
};
use storyreel_error::{ConfigError, StoryreelResult};
use storyreel_models::{ElevenLabsConfig, OpenAiImageConfig};
use storyreel_rate_limit::ProviderLimits;
use tracing::{debug, instrument};

const DEFAULT_CONFIG: &str = include_str!("../../../storyreel.toml");

/// Which provider implementations back the pipeline.
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
pub enum ProviderBackend {
    /// Deterministic offline providers
    #[default]
    Fake,
    /// OpenAI images and ElevenLabs narration
    Live,
}

/// Which media storage backend holds generated media.
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
pub enum StorageBackend {
    /// Content-addressed files under `base_path`
    #[default]
    Filesystem,
    /// Process memory, lost on exit
    Memory,
}

/// `[providers]` section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    /// Provider implementation family
    #[serde(default)]
    pub backend: ProviderBackend,
    /// OpenAI image generation settings
    #[serde(default)]
    pub visual: OpenAiImageConfig,
    /// ElevenLabs text-to-speech settings
    #[serde(default)]
    pub narration: ElevenLabsConfig,
    /// Rate limits for the visual provider
    #[serde(default = "default_visual_limits")]
    pub visual_limits: ProviderLimits,
    /// Rate limits for the narration provider
    #[serde(default = "default_narration_limits")]
    pub narration_limits: ProviderLimits,
}

fn default_visual_limits() -> ProviderLimits {
    ProviderLimits::unlimited("visual")
}

fn default_narration_limits() -> ProviderLimits {
    ProviderLimits::unlimited("narration")
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            backend: ProviderBackend::default(),
            visual: OpenAiImageConfig::default(),
            narration: ElevenLabsConfig::default(),
            visual_limits: default_visual_limits(),
            narration_limits: default_narration_limits(),
        }
    }
}

/// `[storage]` section.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage implementation
    #[serde(default)]
    pub backend: StorageBackend,
    /// Root directory of the filesystem backend
    #[serde(default)]
    pub base_path: Option<PathBuf>,
}

impl StorageConfig {
    /// Configured root, or `storyreel/media` under the local data directory.
    pub fn base_path(&self) -> PathBuf {
        self.base_path.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .map(|dir| dir.join("storyreel").join("media"))
                .unwrap_or_else(|| PathBuf::from("storyreel-media"))
        })
    }
}

/// Complete Storyreel configuration.
///
/// # Example
///
/// ```no_run
/// use storyreel::StoryreelConfig;
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let config = StoryreelConfig::load()?;
/// println!("Max segment length: {}", config.segmentation.max_segment_length);
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct StoryreelConfig {
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
    /// `[providers]`
    #[serde(default)]
    pub providers: ProvidersConfig,
    /// `[storage]`
    #[serde(default)]
    pub storage: StorageConfig,
}

impl StoryreelConfig {
    /// Load bundled defaults overridden by one explicit file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    #[instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn from_file(path: impl AsRef<Path>) -> StoryreelResult<Self> {
        debug!("Loading configuration from file");

        let builder = Config::builder()
            .add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml))
            .add_source(File::from(path.as_ref()));
        Self::build(builder)
    }

    /// Load configuration with precedence: current dir > home dir > bundled defaults.
    ///
    /// User config files are optional and skipped when absent.
    ///
    /// # Errors
    ///
    /// Returns an error if a present file cannot be parsed or the result
    /// fails validation.
    #[instrument]
    pub fn load() -> StoryreelResult<Self> {
        debug!("Loading configuration with precedence: current dir > home dir > bundled defaults");

        let mut builder =
            Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml));

        if let Some(home) = dirs::home_dir() {
            let home_config = home.join(".config/storyreel/storyreel.toml");
            builder = builder.add_source(File::from(home_config).required(false));
        }

        builder = builder.add_source(File::with_name("storyreel").required(false));
        Self::build(builder)
    }

    /// Bundled defaults only.
    ///
    /// # Errors
    ///
    /// Returns an error if the bundled file fails to parse.
    pub fn bundled() -> StoryreelResult<Self> {
        Self::build(Config::builder().add_source(File::from_str(DEFAULT_CONFIG, FileFormat::Toml)))
    }

    fn build(
        builder: config::ConfigBuilder<config::builder::DefaultState>,
    ) -> StoryreelResult<Self> {
        let config: Self = builder
            .build()
            .map_err(|e| ConfigError::new(format!("Failed to build configuration: {}", e)))?
            .try_deserialize()
            .map_err(|e| ConfigError::new(format!("Failed to parse configuration: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the pipeline sections and the backend combination.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` for an invalid pipeline value, or for fake
    /// providers paired with the ffmpeg assembler; fake media references are
    /// never stored, so ffmpeg has nothing to read.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.pipeline().validate()?;
        if self.providers.backend == ProviderBackend::Fake
            && self.assembly.backend == AssemblyBackend::Ffmpeg
        {
            return Err(ConfigError::new(
                "assembly.backend = \"ffmpeg\" requires providers.backend = \"live\"",
            ));
        }
        Ok(())
    }

    /// The sections the pipeline core consumes.
    pub fn pipeline(&self) -> PipelineConfig {
        PipelineConfig {
            segmentation: self.segmentation.clone(),
            duration: self.duration.clone(),
            generation: self.generation.clone(),
            assembly: self.assembly.clone(),
        }
    }
}
