//! Per-segment media generation.

use std::sync::Arc;
use std::time::Duration;

use storyreel_core::{MediaRef, SegmentMedia};
use storyreel_error::{
    PipelineError, PipelineErrorKind, PipelineResult, ProviderError, ProviderErrorKind,
};
use storyreel_interface::{NarrationProvider, VisualProvider};
use storyreel_rate_limit::{ProviderLimits, RateLimiter};
use tracing::{debug, instrument, warn};

use crate::{DurationEstimator, GenerationConfig};

/// Produces the visual, narration and duration of one segment.
///
/// Each provider call passes through that provider's rate limiter, is
/// bounded by the call timeout and is retried on transient failures as the
/// retry policy allows. Visual and narration run concurrently.
#[derive(Clone)]
pub struct SegmentGenerator {
    config: GenerationConfig,
    estimator: DurationEstimator,
    call_timeout: Duration,
    visual: Arc<dyn VisualProvider>,
    narration: Arc<dyn NarrationProvider>,
    visual_limiter: RateLimiter<ProviderLimits>,
    narration_limiter: RateLimiter<ProviderLimits>,
}

impl SegmentGenerator {
    /// Create a generator with unlimited provider rate limits.
    pub fn new(
        config: GenerationConfig,
        estimator: DurationEstimator,
        visual: Arc<dyn VisualProvider>,
        narration: Arc<dyn NarrationProvider>,
    ) -> Self {
        let retry = config.retry_config();
        let visual_limiter =
            RateLimiter::new(ProviderLimits::unlimited(visual.provider_name()), retry);
        let narration_limiter =
            RateLimiter::new(ProviderLimits::unlimited(narration.provider_name()), retry);
        Self {
            call_timeout: config.timeout(),
            config,
            estimator,
            visual,
            narration,
            visual_limiter,
            narration_limiter,
        }
    }

    /// Apply rate limits to the visual provider.
    pub fn with_visual_limits(mut self, limits: ProviderLimits) -> Self {
        self.visual_limiter = RateLimiter::new(limits, self.config.retry_config());
        self
    }

    /// Apply rate limits to the narration provider.
    pub fn with_narration_limits(mut self, limits: ProviderLimits) -> Self {
        self.narration_limiter = RateLimiter::new(limits, self.config.retry_config());
        self
    }

    /// Override the per-call deadline taken from the configuration.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Generate media for the segment at `sequence_index`.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for blank segment text
    /// - `ProviderUnavailable` when a provider has no credentials or configuration
    /// - `GenerationFailed` when a provider call fails or times out
    #[instrument(skip(self, segment_text), fields(chars = segment_text.len()))]
    pub async fn generate(
        &self,
        segment_text: &str,
        sequence_index: usize,
    ) -> PipelineResult<SegmentMedia> {
        if segment_text.trim().is_empty() {
            return Err(PipelineError::invalid_input(format!(
                "segment {} has no text",
                sequence_index
            )));
        }

        let prompt = self.config.visual_prompt(segment_text);
        let visual = self.synthesize_visual(&prompt, sequence_index);
        let narration = async {
            if self.config.audio_enabled {
                self.synthesize_narration(segment_text, sequence_index)
                    .await
                    .map(Some)
            } else {
                Ok(None)
            }
        };
        let (media_ref, narration_ref) = tokio::try_join!(visual, narration)?;

        let duration_seconds = self.estimator.estimate(segment_text);
        debug!(sequence_index, duration_seconds, "Generated segment media");

        Ok(SegmentMedia {
            sequence_index,
            content: segment_text.to_string(),
            duration_seconds,
            media_ref,
            narration_ref,
        })
    }

    async fn synthesize_visual(&self, prompt: &str, sequence_index: usize) -> PipelineResult<MediaRef> {
        let provider = self.visual.as_ref();
        let timeout = self.call_timeout;
        self.visual_limiter
            .execute(|| async move {
                with_deadline(timeout, provider.synthesize_visual(prompt)).await
            })
            .await
            .map_err(|e| provider_failure(sequence_index, provider.provider_name(), e))
    }

    async fn synthesize_narration(
        &self,
        text: &str,
        sequence_index: usize,
    ) -> PipelineResult<MediaRef> {
        let provider = self.narration.as_ref();
        let timeout = self.call_timeout;
        self.narration_limiter
            .execute(|| async move {
                with_deadline(timeout, provider.synthesize_narration(text)).await
            })
            .await
            .map_err(|e| provider_failure(sequence_index, provider.provider_name(), e))
    }
}

async fn with_deadline<F>(timeout: Duration, call: F) -> Result<MediaRef, ProviderError>
where
    F: std::future::Future<Output = Result<MediaRef, ProviderError>>,
{
    match tokio::time::timeout(timeout, call).await {
        Ok(result) => result,
        Err(_) => Err(ProviderError::new(ProviderErrorKind::timeout(timeout))),
    }
}

fn provider_failure(sequence_index: usize, provider: &str, error: ProviderError) -> PipelineError {
    warn!(sequence_index, provider, error = %error.kind, "Provider call failed");
    let kind = if error.kind.is_unavailable() {
        PipelineErrorKind::ProviderUnavailable {
            sequence_index,
            provider: provider.to_string(),
            message: error.kind.to_string(),
        }
    } else {
        PipelineErrorKind::GenerationFailed {
            sequence_index,
            provider: provider.to_string(),
            message: error.kind.to_string(),
        }
    };
    PipelineError::new(kind)
}
