//! Tests for configuration loading and pipeline wiring.

use std::io::Write;
use std::sync::Arc;

use storyreel::{
    AssemblyBackend, InMemoryProjectRepository, OwnerId, Project, ProjectRepository,
    ProjectStatus, ProviderBackend, StorageBackend, StorageConfig, StoryreelConfig, Submission,
    VideoQuality, build_orchestrator, build_storage,
};

fn config_file(contents: &str) -> tempfile::NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .unwrap();
    file.write_all(contents.as_bytes()).unwrap();
    file
}

#[test]
fn test_bundled_defaults() {
    let config = StoryreelConfig::bundled().unwrap();
    assert_eq!(config.segmentation.max_segment_length, 150);
    assert_eq!(config.segmentation.min_unit_length, 10);
    assert_eq!(config.duration.words_per_minute, 200.0);
    assert_eq!(config.duration.minimum_seconds, 3.0);
    assert_eq!(config.generation.max_concurrent, 4);
    assert_eq!(config.generation.max_retries, 0);
    assert_eq!(config.assembly.backend, AssemblyBackend::Manifest);
    assert_eq!(config.providers.backend, ProviderBackend::Fake);
    assert_eq!(config.providers.visual.model, "dall-e-3");
    assert_eq!(config.providers.visual_limits.rpm, Some(5));
    assert_eq!(config.storage.backend, StorageBackend::Filesystem);
}

#[test]
fn test_file_overrides_bundled_defaults() {
    let file = config_file(
        r#"
[segmentation]
max_segment_length = 40

[generation]
max_concurrent = 2
max_retries = 3

[assembly]
quality = "high"

[providers]
backend = "live"

[storage]
backend = "memory"
"#,
    );

    let config = StoryreelConfig::from_file(file.path()).unwrap();
    assert_eq!(config.segmentation.max_segment_length, 40);
    assert_eq!(config.segmentation.min_unit_length, 10);
    assert_eq!(config.generation.max_concurrent, 2);
    assert_eq!(config.generation.max_retries, 3);
    assert_eq!(config.generation.timeout_secs, 120);
    assert_eq!(config.assembly.quality, VideoQuality::High);
    assert_eq!(config.providers.backend, ProviderBackend::Live);
    assert_eq!(config.providers.narration.voice_id, "21m00Tcm4TdQTnDnZyNA");
    assert_eq!(config.storage.backend, StorageBackend::Memory);
}

#[test]
fn test_invalid_values_are_rejected() {
    let file = config_file("[generation]\nmax_concurrent = 0\n");
    let err = StoryreelConfig::from_file(file.path()).unwrap_err();
    assert!(format!("{}", err).contains("max_concurrent"));
}

#[test]
fn test_fake_providers_cannot_feed_ffmpeg() {
    let file = config_file("[assembly]\nbackend = \"ffmpeg\"\n");
    let err = StoryreelConfig::from_file(file.path()).unwrap_err();
    assert!(format!("{}", err).contains("ffmpeg"));

    let file = config_file(
        r#"
[assembly]
backend = "ffmpeg"

[providers]
backend = "live"
"#,
    );
    let config = StoryreelConfig::from_file(file.path()).unwrap();
    assert_eq!(config.assembly.backend, AssemblyBackend::Ffmpeg);
    assert!(config.validate().is_ok());
}

#[test]
fn test_missing_explicit_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(StoryreelConfig::from_file(dir.path().join("absent.toml")).is_err());
}

#[test]
fn test_pipeline_view_matches_sections() {
    let config = StoryreelConfig::bundled().unwrap();
    let pipeline = config.pipeline();
    assert_eq!(pipeline.segmentation, config.segmentation);
    assert_eq!(pipeline.generation, config.generation);
    assert!(pipeline.validate().is_ok());
}

#[tokio::test]
async fn test_filesystem_storage_uses_configured_root() {
    let dir = tempfile::tempdir().unwrap();
    let storage = build_storage(&StorageConfig {
        backend: StorageBackend::Filesystem,
        base_path: Some(dir.path().to_path_buf()),
    })
    .unwrap();
    assert_eq!(storage.backend_name(), "filesystem");
}

#[tokio::test]
async fn test_configured_pipeline_runs_with_fake_providers() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = StoryreelConfig::bundled().unwrap();
    config.segmentation.max_segment_length = 40;
    config.storage.base_path = Some(dir.path().to_path_buf());

    let repository = InMemoryProjectRepository::new();
    let orchestrator = build_orchestrator(&config, Arc::new(repository.clone())).unwrap();
    let project = Project::new_draft(OwnerId::new(), "The lonely dragon", None);
    repository.create_project(&project).await.unwrap();

    let outcome = orchestrator
        .submit(Submission::new(
            *project.id(),
            *project.owner_id(),
            "A dragon wants friends. It flies over the village. The villagers wave back.",
        ))
        .await
        .unwrap();

    assert_eq!(outcome.segments.len(), 3);
    assert_eq!(*outcome.project.status(), ProjectStatus::Completed);
    assert!(outcome.artifact.reference().as_str().starts_with("file://"));
}
