//! Project status lifecycle.

use serde::{Deserialize, Serialize};

/// Lifecycle status of a project.
///
/// `draft -> processing -> (completed | error)`; a project in `error` may be
/// resubmitted, which moves it back to `processing`.
///
/// # Examples
///
/// ```
/// use std::str::FromStr;
/// use storyreel_core::ProjectStatus;
///
/// assert_eq!(ProjectStatus::Processing.to_string(), "processing");
/// assert_eq!(ProjectStatus::from_str("error").unwrap(), ProjectStatus::Error);
/// assert!(ProjectStatus::Error.accepts_submission());
/// assert!(!ProjectStatus::Completed.accepts_submission());
/// ```
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
    strum::EnumIter,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ProjectStatus {
    /// Created, story not yet submitted
    #[default]
    Draft,
    /// Submission in flight
    Processing,
    /// Artifact assembled
    Completed,
    /// Last submission failed
    Error,
}

impl ProjectStatus {
    /// Whether a new submission may start from this status.
    pub fn accepts_submission(&self) -> bool {
        matches!(self, ProjectStatus::Draft | ProjectStatus::Error)
    }

    /// Whether the status ends a submission.
    pub fn is_terminal(&self) -> bool {
        matches!(self, ProjectStatus::Completed | ProjectStatus::Error)
    }
}
