//! Rate limiting and retry for media provider calls.
//!
//! Every provider gets its own [`RateLimiter`], configured from
//! [`ProviderLimits`] (requests per minute and concurrent requests) and a
//! [`RetryConfig`] bounding how often transient failures are retried.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod limiter;
mod tier;

pub use config::{ProviderLimits, RetryConfig};
pub use limiter::{RateLimiter, RateLimiterGuard};
pub use tier::Tier;
