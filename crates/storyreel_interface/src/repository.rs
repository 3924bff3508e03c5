//! Persistence collaborator for projects and segments.

use async_trait::async_trait;
use storyreel_core::{
    NewSegment, OwnerId, Project, ProjectId, Segment, SegmentId, SegmentMediaUpdate,
};
use storyreel_error::StoryreelResult;

/// Repository for persisting projects and their segments.
///
/// Implementations check the project `version` on every update and reject
/// stale writes with a storage `Conflict`.
#[async_trait]
pub trait ProjectRepository: Send + Sync {
    /// Persist a new project.
    async fn create_project(&self, project: &Project) -> StoryreelResult<()>;

    /// Load a project by ID.
    ///
    /// Fails with a storage `NotFound` error for unknown IDs.
    async fn load_project(&self, id: ProjectId) -> StoryreelResult<Project>;

    /// Overwrite a project and return it with its incremented version.
    ///
    /// The stored version must equal `project.version()`.
    async fn update_project(&self, project: &Project) -> StoryreelResult<Project>;

    /// Insert a batch of segments atomically.
    ///
    /// Either every segment is persisted or none is. Returns the stored
    /// records in the order given.
    async fn insert_segments(&self, segments: Vec<NewSegment>) -> StoryreelResult<Vec<Segment>>;

    /// Write generation results onto one segment.
    ///
    /// A segment accepts exactly one media update; a second one is a `Conflict`.
    async fn update_segment_media(
        &self,
        segment_id: SegmentId,
        update: &SegmentMediaUpdate,
    ) -> StoryreelResult<Segment>;

    /// List the segments one submission attempt created, by sequence order.
    async fn list_segments(&self, project_id: ProjectId, attempt: u32)
    -> StoryreelResult<Vec<Segment>>;

    /// List the projects an owner holds, oldest first.
    async fn list_projects(&self, owner_id: OwnerId) -> StoryreelResult<Vec<Project>>;
}
