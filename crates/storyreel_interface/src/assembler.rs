//! Assembly backends.

use async_trait::async_trait;
use storyreel_core::{Artifact, ProjectId, Segment};
use storyreel_error::PipelineResult;

/// Combines generated segment media into one ordered artifact.
#[async_trait]
pub trait Assembler: Send + Sync {
    /// Assemble `segments` into an artifact for `project_id`.
    ///
    /// Every segment must carry a media reference and a duration, and the
    /// sequence orders must be exactly `0..n`. Otherwise fails with
    /// `IncompleteInput` before anything is stored. The artifact is written
    /// with a single final store call.
    async fn assemble(&self, project_id: ProjectId, segments: &[Segment])
    -> PipelineResult<Artifact>;

    /// Backend name recorded on produced artifacts.
    fn backend_name(&self) -> &'static str;
}
