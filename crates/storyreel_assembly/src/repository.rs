//! In-memory implementation of ProjectRepository.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use storyreel_core::{
    NewSegment, OwnerId, Project, ProjectId, Segment, SegmentId, SegmentMediaUpdate,
};
use storyreel_error::{StorageError, StorageErrorKind, StoryreelResult};
use storyreel_interface::ProjectRepository;
use tokio::sync::RwLock;
use tracing::debug;

/// In-memory repository for projects and segments.
///
/// Stores records in HashMaps protected by RwLocks. Clones share the same
/// data, which is lost when the last clone is dropped.
///
/// # Example
///
/// ```
/// use storyreel_assembly::InMemoryProjectRepository;
/// use storyreel_core::{OwnerId, Project};
/// use storyreel_interface::ProjectRepository;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let repo = InMemoryProjectRepository::new();
/// let project = Project::new_draft(OwnerId::new(), "Dragon", None);
/// repo.create_project(&project).await.unwrap();
/// assert_eq!(repo.load_project(*project.id()).await.unwrap(), project);
/// # }
/// ```
#[derive(Debug, Clone, Default)]
pub struct InMemoryProjectRepository {
    projects: Arc<RwLock<HashMap<ProjectId, Project>>>,
    segments: Arc<RwLock<HashMap<SegmentId, Segment>>>,
    reject_segment_inserts: Arc<AtomicBool>,
}

impl InMemoryProjectRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following segment batch insert fail (for testing).
    pub fn reject_segment_inserts(&self, reject: bool) {
        self.reject_segment_inserts.store(reject, Ordering::SeqCst);
    }

    /// Every segment of a project across all attempts, by attempt then order.
    pub async fn all_segments(&self, project_id: ProjectId) -> Vec<Segment> {
        let mut segments: Vec<Segment> = self
            .segments
            .read()
            .await
            .values()
            .filter(|s| *s.project_id() == project_id)
            .cloned()
            .collect();
        segments.sort_by_key(|s| (*s.attempt(), *s.sequence_order()));
        segments
    }

    fn not_found(what: impl std::fmt::Display) -> StorageError {
        StorageError::new(StorageErrorKind::NotFound(what.to_string()))
    }

    fn conflict(message: String) -> StorageError {
        StorageError::new(StorageErrorKind::Conflict(message))
    }
}

#[async_trait]
impl ProjectRepository for InMemoryProjectRepository {
    async fn create_project(&self, project: &Project) -> StoryreelResult<()> {
        let mut projects = self.projects.write().await;
        if projects.contains_key(project.id()) {
            return Err(Self::conflict(format!("project {} already exists", project.id())).into());
        }
        projects.insert(*project.id(), project.clone());
        debug!(project_id = %project.id(), "Created project");
        Ok(())
    }

    async fn load_project(&self, id: ProjectId) -> StoryreelResult<Project> {
        self.projects
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Self::not_found(format!("project {}", id)).into())
    }

    async fn update_project(&self, project: &Project) -> StoryreelResult<Project> {
        let mut projects = self.projects.write().await;
        let stored = projects
            .get_mut(project.id())
            .ok_or_else(|| Self::not_found(format!("project {}", project.id())))?;

        if stored.version() != project.version() {
            return Err(Self::conflict(format!(
                "project {} is at version {}, update was based on {}",
                project.id(),
                stored.version(),
                project.version()
            ))
            .into());
        }

        let mut updated = project.clone();
        updated.set_version(project.version() + 1);
        *stored = updated.clone();
        debug!(
            project_id = %project.id(),
            status = %updated.status(),
            version = updated.version(),
            "Updated project"
        );
        Ok(updated)
    }

    async fn insert_segments(&self, segments: Vec<NewSegment>) -> StoryreelResult<Vec<Segment>> {
        if self.reject_segment_inserts.load(Ordering::SeqCst) {
            return Err(StorageError::new(StorageErrorKind::Unavailable(
                "segment inserts are rejected".to_string(),
            ))
            .into());
        }

        let projects = self.projects.read().await;
        if let Some(missing) = segments
            .iter()
            .find(|s| !projects.contains_key(&s.project_id))
        {
            return Err(Self::not_found(format!("project {}", missing.project_id)).into());
        }
        drop(projects);

        let created: Vec<Segment> = segments.into_iter().map(Segment::create).collect();
        let mut stored = self.segments.write().await;
        for segment in &created {
            stored.insert(*segment.id(), segment.clone());
        }
        debug!(count = created.len(), "Inserted segments");
        Ok(created)
    }

    async fn update_segment_media(
        &self,
        segment_id: SegmentId,
        update: &SegmentMediaUpdate,
    ) -> StoryreelResult<Segment> {
        let mut segments = self.segments.write().await;
        let segment = segments
            .get_mut(&segment_id)
            .ok_or_else(|| Self::not_found(format!("segment {}", segment_id)))?;

        if segment.has_media() {
            return Err(Self::conflict(format!("segment {} already has media", segment_id)).into());
        }

        segment.apply_media(update.clone());
        Ok(segment.clone())
    }

    async fn list_segments(
        &self,
        project_id: ProjectId,
        attempt: u32,
    ) -> StoryreelResult<Vec<Segment>> {
        let mut segments: Vec<Segment> = self
            .segments
            .read()
            .await
            .values()
            .filter(|s| *s.project_id() == project_id && *s.attempt() == attempt)
            .cloned()
            .collect();
        segments.sort_by_key(|s| *s.sequence_order());
        Ok(segments)
    }

    async fn list_projects(&self, owner_id: OwnerId) -> StoryreelResult<Vec<Project>> {
        let mut projects: Vec<Project> = self
            .projects
            .read()
            .await
            .values()
            .filter(|p| *p.owner_id() == owner_id)
            .cloned()
            .collect();
        projects.sort_by_key(|p| *p.created_at());
        Ok(projects)
    }
}
