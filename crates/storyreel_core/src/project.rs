//! Projects and their submission lifecycle.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use storyreel_error::{PipelineError, PipelineResult};

use crate::{MediaRef, OwnerId, ProjectId, ProjectStatus};

/// Why the last submission of a project failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FailureRecord {
    /// Error kind name (`generation_failed`, `assembly_failed`, ...)
    pub kind: String,
    /// Human-readable error message
    pub message: String,
    /// Sequence indices of the segments that failed, ascending
    pub failed_segments: Vec<usize>,
}

impl FailureRecord {
    /// Create a failure record.
    pub fn new(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            message: message.into(),
            failed_segments: Vec::new(),
        }
    }

    /// Attach the failed segment indices, sorted and deduplicated.
    pub fn with_failed_segments(mut self, mut indices: Vec<usize>) -> Self {
        indices.sort_unstable();
        indices.dedup();
        self.failed_segments = indices;
        self
    }
}

/// A user's story-to-video project.
///
/// The story text is set by [`begin_submission`](Self::begin_submission) and
/// therefore present whenever the status is anything but `draft`.
///
/// # Examples
///
/// ```
/// use storyreel_core::{OwnerId, Project, ProjectStatus};
///
/// let mut project = Project::new_draft(OwnerId::new(), "Dragon", None);
/// assert_eq!(*project.status(), ProjectStatus::Draft);
///
/// project.begin_submission("A dragon wants friends.").unwrap();
/// assert_eq!(*project.status(), ProjectStatus::Processing);
/// assert_eq!(*project.attempt(), 1);
/// assert!(project.story_text().is_some());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Project {
    /// Project identifier
    id: ProjectId,
    /// Owning user
    owner_id: OwnerId,
    /// Display title
    title: String,
    /// Optional description
    description: Option<String>,
    /// Story text, set on first submission
    story_text: Option<String>,
    /// Reference to the assembled artifact, set on completion
    artifact_ref: Option<MediaRef>,
    /// Lifecycle status
    status: ProjectStatus,
    /// Number of submissions that entered `processing`
    attempt: u32,
    /// Optimistic concurrency version, maintained by the repository
    version: u64,
    /// Failure of the last submission, if it failed
    failure: Option<FailureRecord>,
    /// Creation time
    created_at: DateTime<Utc>,
    /// Last modification time
    updated_at: DateTime<Utc>,
}

impl Project {
    /// Create a project in `draft` status.
    pub fn new_draft(
        owner_id: OwnerId,
        title: impl Into<String>,
        description: Option<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: ProjectId::new(),
            owner_id,
            title: title.into(),
            description,
            story_text: None,
            artifact_ref: None,
            status: ProjectStatus::Draft,
            attempt: 0,
            version: 0,
            failure: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Store the story text and enter `processing` as a fresh attempt.
    ///
    /// Clears the failure record and artifact of any previous attempt.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the project is `processing` or `completed`.
    #[track_caller]
    pub fn begin_submission(&mut self, story_text: impl Into<String>) -> PipelineResult<()> {
        if !self.status.accepts_submission() {
            return Err(PipelineError::invalid_input(format!(
                "project {} is {} and cannot accept a submission",
                self.id, self.status
            )));
        }
        self.story_text = Some(story_text.into());
        self.artifact_ref = None;
        self.failure = None;
        self.attempt += 1;
        self.status = ProjectStatus::Processing;
        self.touch();
        Ok(())
    }

    /// Record the assembled artifact and enter `completed`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` unless the project is `processing`.
    #[track_caller]
    pub fn complete(&mut self, artifact_ref: MediaRef) -> PipelineResult<()> {
        self.ensure_processing("complete")?;
        self.artifact_ref = Some(artifact_ref);
        self.status = ProjectStatus::Completed;
        self.touch();
        Ok(())
    }

    /// Record a failure and enter `error`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` unless the project is `processing`.
    #[track_caller]
    pub fn fail(&mut self, failure: FailureRecord) -> PipelineResult<()> {
        self.ensure_processing("fail")?;
        self.failure = Some(failure);
        self.status = ProjectStatus::Error;
        self.touch();
        Ok(())
    }

    /// Set the concurrency version. Only persistence implementations call this.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    #[track_caller]
    fn ensure_processing(&self, action: &str) -> PipelineResult<()> {
        if self.status != ProjectStatus::Processing {
            return Err(PipelineError::invalid_input(format!(
                "cannot {} project {} in status {}",
                action, self.id, self.status
            )));
        }
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Utc::now();
    }
}
