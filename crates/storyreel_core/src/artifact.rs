//! The assembled output of a submission.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{MediaRef, ProjectId, SegmentMedia};

/// Final ordered media artifact for a project.
///
/// Built only from fully generated [`SegmentMedia`], so every source segment
/// is guaranteed to carry a media reference and a duration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, derive_getters::Getters)]
pub struct Artifact {
    /// Reference to the stored artifact
    reference: MediaRef,
    /// Owning project
    project_id: ProjectId,
    /// Sum of the source segment durations, in seconds
    total_duration_seconds: f64,
    /// Number of source segments
    segment_count: usize,
    /// Name of the assembly backend that produced it
    backend: String,
    /// Creation time
    created_at: DateTime<Utc>,
}

impl Artifact {
    /// Describe an artifact stored at `reference` and built from `segments`.
    pub fn new(
        reference: MediaRef,
        project_id: ProjectId,
        backend: impl Into<String>,
        segments: &[SegmentMedia],
    ) -> Self {
        Self {
            reference,
            project_id,
            total_duration_seconds: segments.iter().map(|s| s.duration_seconds).sum(),
            segment_count: segments.len(),
            backend: backend.into(),
            created_at: Utc::now(),
        }
    }
}
