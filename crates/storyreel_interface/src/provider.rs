//! External media synthesis providers.

use async_trait::async_trait;
use storyreel_core::MediaRef;
use storyreel_error::ProviderResult;

/// Produces a visual (image or clip) for a prompt.
#[async_trait]
pub trait VisualProvider: Send + Sync {
    /// Synthesize a visual and return a reference to the stored media.
    ///
    /// Fails with `MissingApiKey` or `NotConfigured` when the provider cannot
    /// be used at all, and with other kinds for call failures.
    async fn synthesize_visual(&self, prompt: &str) -> ProviderResult<MediaRef>;

    /// Provider name (e.g., "openai", "fake").
    fn provider_name(&self) -> &str;
}

/// Produces spoken narration for a piece of text.
#[async_trait]
pub trait NarrationProvider: Send + Sync {
    /// Synthesize narration audio and return a reference to the stored media.
    async fn synthesize_narration(&self, text: &str) -> ProviderResult<MediaRef>;

    /// Provider name (e.g., "elevenlabs", "fake").
    fn provider_name(&self) -> &str;
}
