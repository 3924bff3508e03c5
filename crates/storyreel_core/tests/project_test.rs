//! Tests for the project lifecycle and segment media conversions.

use std::str::FromStr;

use storyreel_core::{
    Artifact, FailureRecord, MediaRef, NewSegment, OwnerId, Project, ProjectId, ProjectStatus,
    Segment, SegmentMedia, SegmentMediaUpdate,
};
use storyreel_error::PipelineErrorKind;

fn processing_project() -> Project {
    let mut project = Project::new_draft(OwnerId::new(), "Dragon", Some("A test".to_string()));
    project
        .begin_submission("A dragon wants friends.")
        .expect("draft accepts submission");
    project
}

#[test]
fn test_new_project_is_draft_without_story() {
    let project = Project::new_draft(OwnerId::new(), "Dragon", None);
    assert_eq!(*project.status(), ProjectStatus::Draft);
    assert!(project.story_text().is_none());
    assert!(project.artifact_ref().is_none());
    assert_eq!(*project.attempt(), 0);
}

#[test]
fn test_submission_sets_story_and_processing() {
    let project = processing_project();
    assert_eq!(*project.status(), ProjectStatus::Processing);
    assert_eq!(
        project.story_text().as_deref(),
        Some("A dragon wants friends.")
    );
    assert_eq!(*project.attempt(), 1);
}

#[test]
fn test_processing_and_completed_reject_submission() {
    let mut project = processing_project();
    let err = project.begin_submission("again").unwrap_err();
    assert!(err.is_validation());

    project
        .complete(MediaRef::new("memory://video/abc"))
        .expect("processing project completes");
    assert_eq!(*project.status(), ProjectStatus::Completed);
    let err = project.begin_submission("again").unwrap_err();
    assert!(matches!(err.kind, PipelineErrorKind::InvalidInput(_)));
    assert_eq!(*project.attempt(), 1);
}

#[test]
fn test_resubmission_from_error_clears_failure() {
    let mut project = processing_project();
    project
        .fail(FailureRecord::new("generation_failed", "boom").with_failed_segments(vec![2, 1, 2]))
        .expect("processing project fails");
    assert_eq!(*project.status(), ProjectStatus::Error);
    assert_eq!(
        project.failure().as_ref().map(|f| f.failed_segments.clone()),
        Some(vec![1, 2])
    );

    project
        .begin_submission("A dragon wants friends.")
        .expect("error accepts resubmission");
    assert_eq!(*project.status(), ProjectStatus::Processing);
    assert_eq!(*project.attempt(), 2);
    assert!(project.failure().is_none());
}

#[test]
fn test_fail_requires_processing() {
    let mut project = Project::new_draft(OwnerId::new(), "Dragon", None);
    assert!(project.fail(FailureRecord::new("x", "y")).is_err());
    assert_eq!(*project.status(), ProjectStatus::Draft);
}

#[test]
fn test_status_string_conversions() {
    for (status, text) in [
        (ProjectStatus::Draft, "draft"),
        (ProjectStatus::Processing, "processing"),
        (ProjectStatus::Completed, "completed"),
        (ProjectStatus::Error, "error"),
    ] {
        assert_eq!(status.to_string(), text);
        assert_eq!(ProjectStatus::from_str(text).unwrap(), status);
        assert_eq!(
            serde_json::to_string(&status).unwrap(),
            format!("\"{}\"", text)
        );
    }
}

#[test]
fn test_segment_without_media_is_incomplete() {
    let segment = Segment::create(NewSegment {
        project_id: ProjectId::new(),
        attempt: 1,
        sequence_order: 4,
        content: "It flies over the village".to_string(),
    });
    let err = SegmentMedia::try_from(&segment).unwrap_err();
    assert_eq!(
        err.kind,
        PipelineErrorKind::IncompleteInput {
            sequence_indices: vec![4]
        }
    );
}

#[test]
fn test_segment_media_round_trips_through_update() {
    let mut segment = Segment::create(NewSegment {
        project_id: ProjectId::new(),
        attempt: 1,
        sequence_order: 0,
        content: "A dragon wants friends".to_string(),
    });
    assert!(!segment.has_media());
    segment.apply_media(SegmentMediaUpdate {
        duration_seconds: 3.0,
        media_ref: MediaRef::new("fake://visual/1"),
        narration_ref: Some(MediaRef::new("fake://narration/1")),
    });
    assert!(segment.has_media());

    let media = SegmentMedia::try_from(&segment).unwrap();
    assert_eq!(media.sequence_index, 0);
    assert_eq!(media.duration_seconds, 3.0);
    assert_eq!(media.narration_ref, Some(MediaRef::new("fake://narration/1")));
}

#[test]
fn test_artifact_sums_durations() {
    let project_id = ProjectId::new();
    let segments: Vec<SegmentMedia> = [3.0, 4.0, 5.0]
        .iter()
        .enumerate()
        .map(|(i, d)| SegmentMedia {
            sequence_index: i,
            content: format!("segment {}", i),
            duration_seconds: *d,
            media_ref: MediaRef::new(format!("fake://visual/{}", i)),
            narration_ref: None,
        })
        .collect();
    let artifact = Artifact::new(
        MediaRef::new("memory://manifests/x"),
        project_id,
        "manifest",
        &segments,
    );
    assert_eq!(*artifact.total_duration_seconds(), 12.0);
    assert_eq!(*artifact.segment_count(), 3);
    assert_eq!(artifact.backend(), "manifest");
}

#[test]
fn test_media_ref_scheme_and_path() {
    let media = MediaRef::new("memory://images/abc");
    assert_eq!(media.scheme(), Some("memory"));
    assert_eq!(media.path(), "images/abc");
    assert_eq!(MediaRef::new("plain").scheme(), None);
}
