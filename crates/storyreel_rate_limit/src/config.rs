//! Configuration structures for rate limiting and retry.

use serde::{Deserialize, Serialize};

use crate::Tier;

/// Rate limits for one provider.
///
/// # Example
///
/// ```toml
/// [providers.visual_limits]
/// name = "openai-images"
/// rpm = 50
/// max_concurrent = 4
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProviderLimits {
    /// Name of the limited provider
    #[serde(default = "default_name")]
    pub name: String,

    /// Requests per minute limit
    #[serde(default)]
    pub rpm: Option<u32>,

    /// Maximum concurrent requests
    #[serde(default)]
    pub max_concurrent: Option<u32>,
}

fn default_name() -> String {
    "provider".to_string()
}

impl ProviderLimits {
    /// Limits that never block.
    pub fn unlimited(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            rpm: None,
            max_concurrent: None,
        }
    }
}

impl Default for ProviderLimits {
    fn default() -> Self {
        Self::unlimited(default_name())
    }
}

impl Tier for ProviderLimits {
    fn rpm(&self) -> Option<u32> {
        self.rpm
    }

    fn max_concurrent(&self) -> Option<u32> {
        self.max_concurrent
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// Bounded retry policy for transient provider failures.
///
/// `max_retries = 0` (the default) makes a single attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct RetryConfig {
    /// Retries after the first attempt
    #[serde(default)]
    pub max_retries: usize,

    /// Base of the exponential backoff, in milliseconds
    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,

    /// Upper bound on a single backoff delay, in seconds
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

fn default_initial_backoff_ms() -> u64 {
    500
}

fn default_max_backoff_secs() -> u64 {
    30
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 0,
            initial_backoff_ms: default_initial_backoff_ms(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}
