//! Pipeline error types surfaced by the submission entry point.

/// Specific error conditions for story-to-video pipeline operations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, derive_more::Display)]
pub enum PipelineErrorKind {
    /// Story text, segment text or submission parameters are unusable
    #[display("Invalid input: {}", _0)]
    InvalidInput(String),
    /// A required media provider has no credentials or configuration
    #[display("Provider '{}' unavailable for segment {}: {}", provider, sequence_index, message)]
    ProviderUnavailable {
        /// Segment whose generation needed the provider
        sequence_index: usize,
        /// Provider name
        provider: String,
        /// Underlying provider error
        message: String,
    },
    /// A provider call errored or timed out
    #[display("Generation failed for segment {} ({}): {}", sequence_index, provider, message)]
    GenerationFailed {
        /// Segment whose generation failed
        sequence_index: usize,
        /// Provider name
        provider: String,
        /// Underlying provider error
        message: String,
    },
    /// Assembly attempted before every segment carried media
    #[display("Segments {:?} have no generated media", sequence_indices)]
    IncompleteInput {
        /// Sequence indices lacking media or duration
        sequence_indices: Vec<usize>,
    },
    /// Combining segment media into the artifact failed
    #[display("Assembly failed: {}", _0)]
    AssemblyFailed(String),
    /// The persistence collaborator errored
    #[display("Persistence failed: {}", _0)]
    PersistenceFailed(String),
    /// The submission was cancelled by its caller
    #[display("Submission cancelled")]
    Cancelled,
}

impl PipelineErrorKind {
    /// Stable snake_case name of the kind, used in failure records.
    pub fn name(&self) -> &'static str {
        match self {
            PipelineErrorKind::InvalidInput(_) => "invalid_input",
            PipelineErrorKind::ProviderUnavailable { .. } => "provider_unavailable",
            PipelineErrorKind::GenerationFailed { .. } => "generation_failed",
            PipelineErrorKind::IncompleteInput { .. } => "incomplete_input",
            PipelineErrorKind::AssemblyFailed(_) => "assembly_failed",
            PipelineErrorKind::PersistenceFailed(_) => "persistence_failed",
            PipelineErrorKind::Cancelled => "cancelled",
        }
    }

    /// Sequence index of the affected segment, when the error concerns one.
    pub fn sequence_index(&self) -> Option<usize> {
        match self {
            PipelineErrorKind::ProviderUnavailable { sequence_index, .. }
            | PipelineErrorKind::GenerationFailed { sequence_index, .. } => Some(*sequence_index),
            _ => None,
        }
    }
}

/// Error type for pipeline operations.
///
/// # Examples
///
/// ```
/// use storyreel_error::{PipelineError, PipelineErrorKind};
///
/// let err = PipelineError::new(PipelineErrorKind::GenerationFailed {
///     sequence_index: 1,
///     provider: "openai".to_string(),
///     message: "HTTP 500".to_string(),
/// });
/// assert_eq!(err.kind.sequence_index(), Some(1));
/// assert!(format!("{}", err).contains("segment 1"));
/// ```
#[derive(Debug, Clone, derive_more::Display, derive_more::Error)]
#[display("Pipeline Error: {} at line {} in {}", kind, line, file)]
pub struct PipelineError {
    /// The specific error condition
    pub kind: PipelineErrorKind,
    /// Line number where the error occurred
    pub line: u32,
    /// Source file where the error occurred
    pub file: &'static str,
}

impl PipelineError {
    /// Create a new PipelineError with automatic location tracking.
    #[track_caller]
    pub fn new(kind: PipelineErrorKind) -> Self {
        let location = std::panic::Location::caller();
        Self {
            kind,
            line: location.line(),
            file: location.file(),
        }
    }

    /// Shorthand for an [`PipelineErrorKind::InvalidInput`] error.
    #[track_caller]
    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(PipelineErrorKind::InvalidInput(message.into()))
    }

    /// Whether this is a validation error that must not change project status.
    pub fn is_validation(&self) -> bool {
        matches!(self.kind, PipelineErrorKind::InvalidInput(_))
    }
}

/// Result type for pipeline operations.
pub type PipelineResult<T> = Result<T, PipelineError>;
