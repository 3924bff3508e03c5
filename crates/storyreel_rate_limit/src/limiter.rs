//! Rate limiter implementation using governor and Tokio Semaphore.
//!
//! Governor (GCRA) enforces requests per minute, a Tokio semaphore enforces
//! the concurrent request limit, and tokio-retry2 drives bounded retries of
//! transient failures.

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter as GovernorRateLimiter};
use storyreel_error::RetryableError;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, warn};

use crate::{RetryConfig, Tier};

type DirectRateLimiter = GovernorRateLimiter<NotKeyed, InMemoryState, DefaultClock>;

/// Rate limiter for one provider.
///
/// Clones share the same quotas, so a limiter can be handed to many
/// concurrent generation tasks.
///
/// # Example
///
/// ```
/// use storyreel_rate_limit::{ProviderLimits, RateLimiter, RetryConfig};
///
/// let limits = ProviderLimits {
///     name: "openai".to_string(),
///     rpm: None,
///     max_concurrent: Some(2),
/// };
/// let limiter = RateLimiter::new(limits, RetryConfig::default());
/// let first = limiter.try_acquire();
/// let second = limiter.try_acquire();
/// assert!(first.is_some() && second.is_some());
/// assert!(limiter.try_acquire().is_none());
/// ```
#[derive(Clone)]
pub struct RateLimiter<T: Tier> {
    inner: T,
    retry: RetryConfig,
    rpm_limiter: Option<Arc<DirectRateLimiter>>,
    concurrent_semaphore: Arc<Semaphore>,
}

impl<T: Tier> RateLimiter<T> {
    /// Create a new rate limiter from a tier and a retry policy.
    ///
    /// A tier without `max_concurrent` gets an effectively unbounded semaphore.
    pub fn new(tier: T, retry: RetryConfig) -> Self {
        let rpm_limiter = tier.rpm().and_then(|rpm| {
            NonZeroU32::new(rpm).map(|n| Arc::new(GovernorRateLimiter::direct(Quota::per_minute(n))))
        });

        let max_concurrent = tier
            .max_concurrent()
            .map(|n| n.max(1) as usize)
            .unwrap_or(Semaphore::MAX_PERMITS);

        Self {
            inner: tier,
            retry,
            rpm_limiter,
            concurrent_semaphore: Arc::new(Semaphore::new(max_concurrent)),
        }
    }

    /// The tier this limiter enforces.
    pub fn inner(&self) -> &T {
        &self.inner
    }

    /// The retry policy applied by [`execute`](Self::execute).
    pub fn retry_config(&self) -> &RetryConfig {
        &self.retry
    }

    /// Concurrent slots currently free.
    pub fn available_permits(&self) -> usize {
        self.concurrent_semaphore.available_permits()
    }

    /// Wait until the request quota and a concurrent slot are available.
    ///
    /// The slot is released when the returned guard is dropped.
    pub async fn acquire(&self) -> RateLimiterGuard {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.until_ready().await;
        }

        // Acquire the slot last to avoid holding it while waiting on quota.
        // The semaphore is never closed, so a permit is always granted.
        let permit = self.concurrent_semaphore.clone().acquire_owned().await.ok();

        RateLimiterGuard { _permit: permit }
    }

    /// Try to acquire without waiting.
    ///
    /// Returns `None` if the request quota or the concurrent limit would block.
    pub fn try_acquire(&self) -> Option<RateLimiterGuard> {
        if let Some(limiter) = &self.rpm_limiter {
            limiter.check().ok()?;
        }

        let permit = self.concurrent_semaphore.clone().try_acquire_owned().ok()?;

        Some(RateLimiterGuard {
            _permit: Some(permit),
        })
    }

    /// Execute an operation with rate limiting and bounded retry.
    ///
    /// Each attempt acquires the limiter first. Failures whose
    /// [`RetryableError::is_retryable`] is true are retried with jittered
    /// exponential backoff, at most `max_retries` times; other failures are
    /// returned immediately.
    pub async fn execute<F, Fut, R, E>(&self, operation: F) -> Result<R, E>
    where
        F: Fn() -> Fut,
        Fut: std::future::Future<Output = Result<R, E>>,
        E: RetryableError + std::fmt::Display,
    {
        let retry_strategy = ExponentialBackoff::from_millis(self.retry.initial_backoff_ms.max(1))
            .factor(2)
            .max_delay(Duration::from_secs(self.retry.max_backoff_secs))
            .map(jitter)
            .take(self.retry.max_retries);

        let tier = self.inner.name();

        Retry::spawn(retry_strategy, || async {
            let _guard = self.acquire().await;
            debug!(tier, "Rate limit acquired, calling provider");

            match operation().await {
                Ok(value) => Ok(value),
                Err(e) if e.is_retryable() => {
                    warn!(tier, error = %e, "Transient error, may retry");
                    Err(RetryError::Transient {
                        err: e,
                        retry_after: None,
                    })
                }
                Err(e) => {
                    warn!(tier, error = %e, "Permanent error, failing immediately");
                    Err(RetryError::Permanent(e))
                }
            }
        })
        .await
    }
}

/// RAII guard for the rate limiter.
///
/// Releases the concurrent slot when dropped, including on error or panic.
pub struct RateLimiterGuard {
    _permit: Option<OwnedSemaphorePermit>,
}
