//! Tests for rate limiting and bounded retry.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use storyreel_error::{ProviderError, ProviderErrorKind};
use storyreel_rate_limit::{ProviderLimits, RateLimiter, RetryConfig, Tier};

fn fast_retry(max_retries: usize) -> RetryConfig {
    RetryConfig {
        max_retries,
        initial_backoff_ms: 1,
        max_backoff_secs: 1,
    }
}

fn transient() -> ProviderError {
    ProviderError::new(ProviderErrorKind::HttpError {
        status_code: 503,
        message: "overloaded".to_string(),
    })
}

#[test]
fn test_provider_limits_implement_tier() {
    let limits = ProviderLimits {
        name: "elevenlabs".to_string(),
        rpm: Some(30),
        max_concurrent: Some(2),
    };
    assert_eq!(limits.rpm(), Some(30));
    assert_eq!(limits.max_concurrent(), Some(2));
    assert_eq!(limits.name(), "elevenlabs");
    assert_eq!(ProviderLimits::unlimited("fake").rpm(), None);
}

#[test]
fn test_retry_defaults_to_single_attempt() {
    assert_eq!(RetryConfig::default().max_retries, 0);
}

#[tokio::test]
async fn test_concurrent_limit_blocks_try_acquire() {
    let limiter = RateLimiter::new(
        ProviderLimits {
            name: "test".to_string(),
            rpm: None,
            max_concurrent: Some(1),
        },
        RetryConfig::default(),
    );

    let guard = limiter.acquire().await;
    assert_eq!(limiter.available_permits(), 0);
    assert!(limiter.try_acquire().is_none());
    drop(guard);
    assert!(limiter.try_acquire().is_some());
}

#[tokio::test]
async fn test_execute_without_retries_makes_one_attempt() {
    let limiter = RateLimiter::new(ProviderLimits::unlimited("test"), fast_retry(0));
    let calls = Arc::new(AtomicUsize::new(0));

    let result: Result<(), ProviderError> = limiter
        .execute(|| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_execute_retries_transient_errors_up_to_bound() {
    let limiter = RateLimiter::new(ProviderLimits::unlimited("test"), fast_retry(2));
    let calls = Arc::new(AtomicUsize::new(0));

    let result: Result<(), ProviderError> = limiter
        .execute(|| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(transient())
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_execute_recovers_after_transient_error() {
    let limiter = RateLimiter::new(ProviderLimits::unlimited("test"), fast_retry(3));
    let calls = Arc::new(AtomicUsize::new(0));

    let result = limiter
        .execute(|| {
            let calls = calls.clone();
            async move {
                if calls.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(transient())
                } else {
                    Ok("media")
                }
            }
        })
        .await;

    assert_eq!(result.unwrap(), "media");
    assert_eq!(calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_execute_does_not_retry_permanent_errors() {
    let limiter = RateLimiter::new(ProviderLimits::unlimited("test"), fast_retry(5));
    let calls = Arc::new(AtomicUsize::new(0));

    let result: Result<(), ProviderError> = limiter
        .execute(|| {
            let calls = calls.clone();
            async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ProviderError::new(ProviderErrorKind::HttpError {
                    status_code: 401,
                    message: "bad key".to_string(),
                }))
            }
        })
        .await;

    assert!(result.is_err());
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}
