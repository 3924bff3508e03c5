//! Top-level error wrapper types.

use crate::{ConfigError, PipelineError, ProviderError, StorageError};

/// Every error family produced inside the workspace.
///
/// # Examples
///
/// ```
/// use storyreel_error::{ConfigError, StoryreelError};
///
/// let err: StoryreelError = ConfigError::new("Missing field").into();
/// assert!(format!("{}", err).contains("Configuration Error"));
/// ```
#[derive(Debug, derive_more::From, derive_more::Display, derive_more::Error)]
pub enum StoryreelErrorKind {
    /// Configuration error
    #[from(ConfigError)]
    Config(ConfigError),
    /// Storage or persistence error
    #[from(StorageError)]
    Storage(StorageError),
    /// Media provider error
    #[from(ProviderError)]
    Provider(ProviderError),
    /// Pipeline error
    #[from(PipelineError)]
    Pipeline(PipelineError),
}

/// Storyreel error with kind discrimination.
///
/// # Examples
///
/// ```
/// use storyreel_error::{StorageError, StorageErrorKind, StoryreelErrorKind, StoryreelResult};
///
/// fn load() -> StoryreelResult<()> {
///     Err(StorageError::new(StorageErrorKind::NotFound("project".to_string())).into())
/// }
///
/// let err = load().unwrap_err();
/// assert!(matches!(err.kind(), StoryreelErrorKind::Storage(_)));
/// ```
#[derive(Debug, derive_more::Display, derive_more::Error)]
#[display("Storyreel Error: {}", _0)]
pub struct StoryreelError(Box<StoryreelErrorKind>);

impl StoryreelError {
    /// Create a new error from a kind.
    pub fn new(kind: StoryreelErrorKind) -> Self {
        Self(Box::new(kind))
    }

    /// Get the error kind.
    pub fn kind(&self) -> &StoryreelErrorKind {
        &self.0
    }

    /// Whether the error reports a missing record.
    pub fn is_not_found(&self) -> bool {
        matches!(self.kind(), StoryreelErrorKind::Storage(e) if e.is_not_found())
    }
}

// Generic From implementation for any type that converts to StoryreelErrorKind
impl<T> From<T> for StoryreelError
where
    T: Into<StoryreelErrorKind>,
{
    fn from(err: T) -> Self {
        Self::new(err.into())
    }
}

/// Result type for Storyreel operations.
pub type StoryreelResult<T> = std::result::Result<T, StoryreelError>;
