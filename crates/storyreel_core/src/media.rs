//! Opaque media references.

use serde::{Deserialize, Serialize};

/// URI-like reference to a stored media object.
///
/// Providers and storage backends hand these out; the pipeline only passes
/// them along. The scheme names the backend that can resolve the reference
/// (`file://`, `memory://`, `fake://`).
///
/// # Examples
///
/// ```
/// use storyreel_core::MediaRef;
///
/// let media = MediaRef::new("file:///var/storyreel/images/ab/cd/abcd");
/// assert_eq!(media.scheme(), Some("file"));
/// assert_eq!(media.to_string(), "file:///var/storyreel/images/ab/cd/abcd");
/// ```
#[derive(
    Debug,
    Clone,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    derive_more::Display,
    derive_more::From,
)]
#[serde(transparent)]
pub struct MediaRef(String);

impl MediaRef {
    /// Wrap a reference string.
    pub fn new(reference: impl Into<String>) -> Self {
        Self(reference.into())
    }

    /// The reference as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The URI scheme, if the reference has one.
    pub fn scheme(&self) -> Option<&str> {
        self.0.split_once("://").map(|(scheme, _)| scheme)
    }

    /// Everything after `scheme://`, or the whole reference when there is no scheme.
    pub fn path(&self) -> &str {
        self.0
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.0)
    }
}

impl From<&str> for MediaRef {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}
