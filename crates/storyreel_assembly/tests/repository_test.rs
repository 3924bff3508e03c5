//! Tests for the in-memory project repository.

use storyreel_assembly::InMemoryProjectRepository;
use storyreel_core::{MediaRef, NewSegment, OwnerId, Project, SegmentMediaUpdate};
use storyreel_error::{StorageErrorKind, StoryreelErrorKind};
use storyreel_interface::ProjectRepository;

fn media_update() -> SegmentMediaUpdate {
    SegmentMediaUpdate {
        duration_seconds: 3.0,
        media_ref: MediaRef::new("fake://visual/abc"),
        narration_ref: None,
    }
}

fn is_conflict(kind: &StoryreelErrorKind) -> bool {
    matches!(kind, StoryreelErrorKind::Storage(e) if matches!(e.kind, StorageErrorKind::Conflict(_)))
}

#[tokio::test]
async fn test_update_increments_version_and_rejects_stale_writes() {
    let repo = InMemoryProjectRepository::new();
    let project = Project::new_draft(OwnerId::new(), "Dragon", None);
    repo.create_project(&project).await.unwrap();

    let updated = repo.update_project(&project).await.unwrap();
    assert_eq!(*updated.version(), project.version() + 1);

    let err = repo.update_project(&project).await.unwrap_err();
    assert!(is_conflict(err.kind()));
}

#[tokio::test]
async fn test_unknown_project_is_not_found() {
    let repo = InMemoryProjectRepository::new();
    let project = Project::new_draft(OwnerId::new(), "Dragon", None);
    assert!(repo.load_project(*project.id()).await.unwrap_err().is_not_found());
    assert!(repo.update_project(&project).await.unwrap_err().is_not_found());
}

#[tokio::test]
async fn test_segment_media_is_written_once() {
    let repo = InMemoryProjectRepository::new();
    let project = Project::new_draft(OwnerId::new(), "Dragon", None);
    repo.create_project(&project).await.unwrap();

    let segments = repo
        .insert_segments(vec![NewSegment {
            project_id: *project.id(),
            attempt: 1,
            sequence_order: 0,
            content: "A dragon wants friends".to_string(),
        }])
        .await
        .unwrap();
    let id = *segments[0].id();

    let populated = repo.update_segment_media(id, &media_update()).await.unwrap();
    assert!(populated.has_media());

    let err = repo.update_segment_media(id, &media_update()).await.unwrap_err();
    assert!(is_conflict(err.kind()));
}

#[tokio::test]
async fn test_segments_of_unknown_project_are_rejected() {
    let repo = InMemoryProjectRepository::new();
    let project = Project::new_draft(OwnerId::new(), "Dragon", None);

    let err = repo
        .insert_segments(vec![NewSegment {
            project_id: *project.id(),
            attempt: 1,
            sequence_order: 0,
            content: "A dragon wants friends".to_string(),
        }])
        .await
        .unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_list_segments_filters_by_attempt_in_order() {
    let repo = InMemoryProjectRepository::new();
    let project = Project::new_draft(OwnerId::new(), "Dragon", None);
    repo.create_project(&project).await.unwrap();

    let batch = |attempt: u32| {
        (0..3)
            .rev()
            .map(|order| NewSegment {
                project_id: *project.id(),
                attempt,
                sequence_order: order,
                content: format!("Scene {} of attempt {}", order, attempt),
            })
            .collect::<Vec<_>>()
    };
    repo.insert_segments(batch(1)).await.unwrap();
    repo.insert_segments(batch(2)).await.unwrap();

    let second = repo.list_segments(*project.id(), 2).await.unwrap();
    let orders: Vec<usize> = second.iter().map(|s| *s.sequence_order()).collect();
    assert_eq!(orders, vec![0, 1, 2]);
    assert!(second.iter().all(|s| *s.attempt() == 2));
}

#[tokio::test]
async fn test_list_projects_by_owner() {
    let repo = InMemoryProjectRepository::new();
    let owner = OwnerId::new();
    let first = Project::new_draft(owner, "First", None);
    let second = Project::new_draft(owner, "Second", None);
    let other = Project::new_draft(OwnerId::new(), "Other", None);
    for project in [&first, &second, &other] {
        repo.create_project(project).await.unwrap();
    }

    let projects = repo.list_projects(owner).await.unwrap();
    assert_eq!(projects.len(), 2);
    assert!(projects.iter().all(|p| *p.owner_id() == owner));
}
