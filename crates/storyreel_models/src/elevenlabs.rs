//! ElevenLabs text-to-speech provider.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use storyreel_core::MediaRef;
use storyreel_error::{ProviderError, ProviderErrorKind, ProviderResult};
use storyreel_interface::NarrationProvider;
use storyreel_storage::{MediaMetadata, MediaStorage, MediaType};
use tracing::{debug, instrument};

use crate::http::{check_status, require_key, transport_error};

/// Environment variable holding the ElevenLabs API key.
pub const ELEVENLABS_API_KEY_VAR: &str = "ELEVENLABS_API_KEY";

const PROVIDER: &str = "elevenlabs";

/// Settings for [`ElevenLabsNarrationProvider`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ElevenLabsConfig {
    /// API root, without the `/v1` path
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Voice used for narration
    #[serde(default = "default_voice_id")]
    pub voice_id: String,

    /// Synthesis model
    #[serde(default = "default_model_id")]
    pub model_id: String,

    /// Voice stability (0.0-1.0)
    #[serde(default = "default_stability")]
    pub stability: f32,

    /// Similarity boost (0.0-1.0)
    #[serde(default = "default_similarity_boost")]
    pub similarity_boost: f32,
}

fn default_base_url() -> String {
    "https://api.elevenlabs.io".to_string()
}

fn default_voice_id() -> String {
    "21m00Tcm4TdQTnDnZyNA".to_string()
}

fn default_model_id() -> String {
    "eleven_multilingual_v2".to_string()
}

fn default_stability() -> f32 {
    0.5
}

fn default_similarity_boost() -> f32 {
    0.75
}

impl Default for ElevenLabsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            voice_id: default_voice_id(),
            model_id: default_model_id(),
            stability: default_stability(),
            similarity_boost: default_similarity_boost(),
        }
    }
}

#[derive(Debug, Serialize)]
struct SpeechRequest<'a> {
    text: &'a str,
    model_id: &'a str,
    voice_settings: VoiceSettings,
}

#[derive(Debug, Serialize)]
struct VoiceSettings {
    stability: f32,
    similarity_boost: f32,
}

/// Narration provider backed by `POST /v1/text-to-speech/{voice_id}`.
///
/// The returned MP3 is stored in media storage.
#[derive(Clone)]
pub struct ElevenLabsNarrationProvider {
    client: Client,
    config: ElevenLabsConfig,
    api_key: Option<String>,
    storage: Arc<dyn MediaStorage>,
}

impl ElevenLabsNarrationProvider {
    /// Create a provider.
    pub fn new(
        config: ElevenLabsConfig,
        api_key: Option<String>,
        storage: Arc<dyn MediaStorage>,
    ) -> Self {
        debug!(voice_id = %config.voice_id, "Creating ElevenLabs narration provider");
        Self {
            client: Client::new(),
            config,
            api_key,
            storage,
        }
    }

    /// Create a provider reading the key from `ELEVENLABS_API_KEY`.
    pub fn from_env(config: ElevenLabsConfig, storage: Arc<dyn MediaStorage>) -> Self {
        Self::new(config, std::env::var(ELEVENLABS_API_KEY_VAR).ok(), storage)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/text-to-speech/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.voice_id
        )
    }
}

#[async_trait]
impl NarrationProvider for ElevenLabsNarrationProvider {
    #[instrument(skip(self, text), fields(voice_id = %self.config.voice_id, text_len = text.len()))]
    async fn synthesize_narration(&self, text: &str) -> ProviderResult<MediaRef> {
        let api_key = require_key(&self.api_key, PROVIDER, ELEVENLABS_API_KEY_VAR)?;

        let request = SpeechRequest {
            text,
            model_id: &self.config.model_id,
            voice_settings: VoiceSettings {
                stability: self.config.stability,
                similarity_boost: self.config.similarity_boost,
            },
        };

        let response = self
            .client
            .post(self.endpoint())
            .header("xi-api-key", api_key)
            .header("accept", "audio/mpeg")
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let response = check_status(PROVIDER, response).await?;

        let audio = response
            .bytes()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        if audio.is_empty() {
            return Err(ProviderError::new(ProviderErrorKind::Parse(
                "text-to-speech response was empty".to_string(),
            )));
        }

        let reference = self
            .storage
            .store(&audio, &MediaMetadata::new(MediaType::Audio, "audio/mpeg"))
            .await
            .map_err(|e| ProviderError::new(ProviderErrorKind::Storage(e.to_string())))?;

        debug!(reference = %reference, size = audio.len(), "Stored narration audio");
        Ok(reference)
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}
