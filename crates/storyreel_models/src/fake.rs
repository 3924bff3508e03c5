//! Deterministic providers for tests and offline runs.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use storyreel_core::MediaRef;
use storyreel_error::{ProviderError, ProviderErrorKind, ProviderResult};
use storyreel_interface::{NarrationProvider, VisualProvider};
use storyreel_storage::content_hash;
use tracing::debug;

/// Behaviour injected into a fake provider.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FakeBehavior {
    /// Fail permanently when the input contains this text
    pub fail_when_contains: Option<String>,
    /// Fail the first N calls with a retryable HTTP 503
    pub transient_failures: usize,
    /// Sleep before answering
    pub delay: Option<Duration>,
    /// Report missing configuration on every call
    pub unconfigured: bool,
}

#[derive(Debug, Default)]
struct CallStats {
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

struct InFlight<'a>(&'a CallStats);

impl<'a> InFlight<'a> {
    fn enter(stats: &'a CallStats) -> Self {
        let now = stats.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        stats.max_in_flight.fetch_max(now, Ordering::SeqCst);
        Self(stats)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.in_flight.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug, Clone)]
struct FakeCore {
    kind: &'static str,
    behavior: FakeBehavior,
    stats: Arc<CallStats>,
}

impl FakeCore {
    fn new(kind: &'static str) -> Self {
        Self {
            kind,
            behavior: FakeBehavior::default(),
            stats: Arc::new(CallStats::default()),
        }
    }

    async fn synthesize(&self, input: &str) -> ProviderResult<MediaRef> {
        let call = self.stats.calls.fetch_add(1, Ordering::SeqCst);
        let _in_flight = InFlight::enter(&self.stats);

        if self.behavior.unconfigured {
            return Err(ProviderError::new(ProviderErrorKind::NotConfigured(format!(
                "fake {} provider has no configuration",
                self.kind
            ))));
        }

        if let Some(delay) = self.behavior.delay {
            tokio::time::sleep(delay).await;
        }

        if call < self.behavior.transient_failures {
            return Err(ProviderError::new(ProviderErrorKind::HttpError {
                status_code: 503,
                message: format!("fake {} provider overloaded", self.kind),
            }));
        }

        if let Some(needle) = &self.behavior.fail_when_contains {
            if input.contains(needle.as_str()) {
                return Err(ProviderError::new(ProviderErrorKind::Rejected(format!(
                    "fake {} provider refuses input containing '{}'",
                    self.kind, needle
                ))));
            }
        }

        let reference = MediaRef::new(format!(
            "fake://{}/{}",
            self.kind,
            content_hash(input.as_bytes())
        ));
        debug!(reference = %reference, "Fake provider produced media");
        Ok(reference)
    }
}

macro_rules! fake_provider_builders {
    () => {
        /// Fail permanently for inputs containing `needle`.
        pub fn failing_when_contains(mut self, needle: impl Into<String>) -> Self {
            self.core.behavior.fail_when_contains = Some(needle.into());
            self
        }

        /// Fail the first `count` calls with a retryable error.
        pub fn with_transient_failures(mut self, count: usize) -> Self {
            self.core.behavior.transient_failures = count;
            self
        }

        /// Sleep for `delay` before answering each call.
        pub fn with_delay(mut self, delay: Duration) -> Self {
            self.core.behavior.delay = Some(delay);
            self
        }

        /// Report missing configuration on every call.
        pub fn unconfigured(mut self) -> Self {
            self.core.behavior.unconfigured = true;
            self
        }

        /// Replace the whole behaviour.
        pub fn with_behavior(mut self, behavior: FakeBehavior) -> Self {
            self.core.behavior = behavior;
            self
        }

        /// Calls received so far, across clones.
        pub fn calls(&self) -> usize {
            self.core.stats.calls.load(Ordering::SeqCst)
        }

        /// Highest number of simultaneously running calls observed.
        pub fn max_in_flight(&self) -> usize {
            self.core.stats.max_in_flight.load(Ordering::SeqCst)
        }
    };
}

/// Visual provider answering `fake://visual/<sha256 of prompt>`.
///
/// # Examples
///
/// ```
/// use storyreel_interface::VisualProvider;
/// use storyreel_models::FakeVisualProvider;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let provider = FakeVisualProvider::new();
/// let first = provider.synthesize_visual("a dragon").await.unwrap();
/// let second = provider.synthesize_visual("a dragon").await.unwrap();
/// assert_eq!(first, second);
/// assert!(first.as_str().starts_with("fake://visual/"));
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FakeVisualProvider {
    core: FakeCore,
}

impl FakeVisualProvider {
    /// A provider that always succeeds immediately.
    pub fn new() -> Self {
        Self {
            core: FakeCore::new("visual"),
        }
    }

    fake_provider_builders!();
}

impl Default for FakeVisualProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl VisualProvider for FakeVisualProvider {
    async fn synthesize_visual(&self, prompt: &str) -> ProviderResult<MediaRef> {
        self.core.synthesize(prompt).await
    }

    fn provider_name(&self) -> &str {
        "fake-visual"
    }
}

/// Narration provider answering `fake://narration/<sha256 of text>`.
#[derive(Debug, Clone)]
pub struct FakeNarrationProvider {
    core: FakeCore,
}

impl FakeNarrationProvider {
    /// A provider that always succeeds immediately.
    pub fn new() -> Self {
        Self {
            core: FakeCore::new("narration"),
        }
    }

    fake_provider_builders!();
}

impl Default for FakeNarrationProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NarrationProvider for FakeNarrationProvider {
    async fn synthesize_narration(&self, text: &str) -> ProviderResult<MediaRef> {
        self.core.synthesize(text).await
    }

    fn provider_name(&self) -> &str {
        "fake-narration"
    }
}
