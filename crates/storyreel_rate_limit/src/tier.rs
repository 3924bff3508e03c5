//! Tier trait for representing provider rate limit constraints.

/// Represents rate limiting constraints for a provider.
///
/// All limits return `Option<u32>` where `None` means unlimited.
///
/// # Example
///
/// ```
/// use storyreel_rate_limit::Tier;
///
/// struct Hobby;
///
/// impl Tier for Hobby {
///     fn rpm(&self) -> Option<u32> { Some(5) }
///     fn max_concurrent(&self) -> Option<u32> { Some(1) }
///     fn name(&self) -> &str { "hobby" }
/// }
///
/// assert_eq!(Hobby.rpm(), Some(5));
/// ```
pub trait Tier: Send + Sync {
    /// Requests per minute limit.
    fn rpm(&self) -> Option<u32>;

    /// Maximum concurrent requests.
    fn max_concurrent(&self) -> Option<u32>;

    /// Name used in log events.
    fn name(&self) -> &str;
}
