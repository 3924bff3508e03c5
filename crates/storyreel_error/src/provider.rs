//! Media provider error types and retry classification.

use std::time::Duration;

/// Provider-specific error conditions.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum ProviderErrorKind {
    /// API key not found in configuration or environment
    #[display("{} API key not configured ({} not set)", provider, variable)]
    MissingApiKey {
        /// Provider name
        provider: String,
        /// Environment variable expected to hold the key
        variable: String,
    },
    /// Provider is missing required non-credential configuration
    #[display("Provider not configured: {}", _0)]
    NotConfigured(String),
    /// HTTP error with status code and message
    #[display("HTTP {} error: {}", status_code, message)]
    HttpError {
        /// HTTP status code
        status_code: u16,
        /// Error message
        message: String,
    },
    /// Transport-level request failure
    #[display("Request failed: {}", _0)]
    Request(String),
    /// Response body could not be decoded
    #[display("Failed to parse response: {}", _0)]
    Parse(String),
    /// Call exceeded its deadline
    #[display("Provider call timed out after {} ms", _0)]
    Timeout(u64),
    /// Generated media could not be stored
    #[display("Failed to store generated media: {}", _0)]
    Storage(String),
    /// Provider rejected the request
    #[display("Provider rejected request: {}", _0)]
    Rejected(String),
}

impl ProviderErrorKind {
    /// Deadline error for a call cut off after `limit`.
    ///
    /// Milliseconds saturate at `u64::MAX`.
    ///
    /// ```
    /// use std::time::Duration;
    /// use storyreel_error::ProviderErrorKind;
    ///
    /// assert_eq!(
    ///     ProviderErrorKind::timeout(Duration::from_secs(2)),
    ///     ProviderErrorKind::Timeout(2000)
    /// );
    /// assert_eq!(
    ///     ProviderErrorKind::timeout(Duration::MAX),
    ///     ProviderErrorKind::Timeout(u64::MAX)
    /// );
    /// ```
    pub fn timeout(limit: Duration) -> Self {
        ProviderErrorKind::Timeout(u64::try_from(limit.as_millis()).unwrap_or(u64::MAX))
    }

    /// Check if this error type should be retried.
    pub fn is_retryable(&self) -> bool {
        match self {
            ProviderErrorKind::HttpError { status_code, .. } => {
                matches!(*status_code, 408 | 429 | 500 | 502 | 503 | 504)
            }
            ProviderErrorKind::Request(_) => true,
            ProviderErrorKind::Timeout(_) => true,
            _ => false,
        }
    }

    /// Whether the provider cannot be used at all in its current configuration.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            ProviderErrorKind::MissingApiKey { .. } | ProviderErrorKind::NotConfigured(_)
        )
    }
}

/// Provider error with source location tracking.
///
/// # Examples
///
/// ```
/// use storyreel_error::{ProviderError, ProviderErrorKind, RetryableError};
///
/// let err = ProviderError::new(ProviderErrorKind::HttpError {
///     status_code: 503,
///     message: "Service unavailable".to_string(),
/// });
/// assert!(err.is_retryable());
/// assert!(!err.kind.is_unavailable());
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Provider Error: {} at line {} in {}", kind, line, file)]
pub struct ProviderError {
    /// The kind of error that occurred
    pub kind: ProviderErrorKind,
    /// Line number where error was created
    pub line: u32,
    /// File where error was created
    pub file: &'static str,
}

impl ProviderError {
    /// Create a new ProviderError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: ProviderErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }
}

/// Trait for errors that support retry logic.
///
/// Transient errors like 503 (service unavailable), 429 (rate limit) or
/// timeouts report `true` from [`is_retryable`](Self::is_retryable).
/// Permanent errors like 401 or 400 report `false`.
pub trait RetryableError {
    /// Returns true if this error should trigger a retry.
    fn is_retryable(&self) -> bool;
}

impl RetryableError for ProviderError {
    fn is_retryable(&self) -> bool {
        self.kind.is_retryable()
    }
}

/// Result type for provider operations.
pub type ProviderResult<T> = Result<T, ProviderError>;
