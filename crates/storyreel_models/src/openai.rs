//! OpenAI image generation provider.

use std::sync::Arc;

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use storyreel_core::MediaRef;
use storyreel_error::{ProviderError, ProviderErrorKind, ProviderResult};
use storyreel_interface::VisualProvider;
use storyreel_storage::{MediaMetadata, MediaStorage, MediaType};
use tracing::{debug, instrument};

use crate::http::{check_status, require_key, transport_error};

/// Environment variable holding the OpenAI API key.
pub const OPENAI_API_KEY_VAR: &str = "OPENAI_API_KEY";

const PROVIDER: &str = "openai";

/// Settings for [`OpenAiImageProvider`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpenAiImageConfig {
    /// API root, without the `/v1` path
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Image model
    #[serde(default = "default_model")]
    pub model: String,

    /// Requested image size
    #[serde(default = "default_size")]
    pub size: String,
}

fn default_base_url() -> String {
    "https://api.openai.com".to_string()
}

fn default_model() -> String {
    "dall-e-3".to_string()
}

fn default_size() -> String {
    "1024x1024".to_string()
}

impl Default for OpenAiImageConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            size: default_size(),
        }
    }
}

#[derive(Debug, Serialize)]
struct ImageRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    n: u32,
    size: &'a str,
    response_format: &'a str,
}

#[derive(Debug, Deserialize)]
struct ImageResponse {
    data: Vec<ImageData>,
}

#[derive(Debug, Deserialize)]
struct ImageData {
    b64_json: Option<String>,
}

/// Visual provider backed by `POST /v1/images/generations`.
///
/// The returned PNG is stored in media storage. A missing API key surfaces as
/// `MissingApiKey` when a visual is requested, not at construction.
#[derive(Clone)]
pub struct OpenAiImageProvider {
    client: Client,
    config: OpenAiImageConfig,
    api_key: Option<String>,
    storage: Arc<dyn MediaStorage>,
}

impl OpenAiImageProvider {
    /// Create a provider.
    pub fn new(
        config: OpenAiImageConfig,
        api_key: Option<String>,
        storage: Arc<dyn MediaStorage>,
    ) -> Self {
        debug!(model = %config.model, "Creating OpenAI image provider");
        Self {
            client: Client::new(),
            config,
            api_key,
            storage,
        }
    }

    /// Create a provider reading the key from `OPENAI_API_KEY`.
    pub fn from_env(config: OpenAiImageConfig, storage: Arc<dyn MediaStorage>) -> Self {
        Self::new(config, std::env::var(OPENAI_API_KEY_VAR).ok(), storage)
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/v1/images/generations",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl VisualProvider for OpenAiImageProvider {
    #[instrument(skip(self, prompt), fields(model = %self.config.model, prompt_len = prompt.len()))]
    async fn synthesize_visual(&self, prompt: &str) -> ProviderResult<MediaRef> {
        let api_key = require_key(&self.api_key, PROVIDER, OPENAI_API_KEY_VAR)?;

        let request = ImageRequest {
            model: &self.config.model,
            prompt,
            n: 1,
            size: &self.config.size,
            response_format: "b64_json",
        };

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| transport_error(PROVIDER, e))?;
        let response = check_status(PROVIDER, response).await?;

        let body: ImageResponse = response.json().await.map_err(|e| {
            ProviderError::new(ProviderErrorKind::Parse(format!(
                "image response: {}",
                e
            )))
        })?;

        let encoded = body
            .data
            .into_iter()
            .find_map(|d| d.b64_json)
            .ok_or_else(|| {
                ProviderError::new(ProviderErrorKind::Parse(
                    "image response contained no b64_json data".to_string(),
                ))
            })?;

        let bytes = STANDARD.decode(encoded.as_bytes()).map_err(|e| {
            ProviderError::new(ProviderErrorKind::Parse(format!("image payload: {}", e)))
        })?;

        let reference = self
            .storage
            .store(&bytes, &MediaMetadata::new(MediaType::Image, "image/png"))
            .await
            .map_err(|e| ProviderError::new(ProviderErrorKind::Storage(e.to_string())))?;

        debug!(reference = %reference, size = bytes.len(), "Stored generated image");
        Ok(reference)
    }

    fn provider_name(&self) -> &str {
        PROVIDER
    }
}
