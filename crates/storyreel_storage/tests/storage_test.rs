//! Tests for filesystem and in-memory storage backends.

use storyreel_core::MediaRef;
use storyreel_error::{StorageErrorKind, StoryreelErrorKind};
use storyreel_storage::{
    FileSystemStorage, InMemoryStorage, MediaMetadata, MediaStorage, MediaType, content_hash,
};
use tempfile::TempDir;

fn storage_kind(err: &storyreel_error::StoryreelError) -> &StorageErrorKind {
    match err.kind() {
        StoryreelErrorKind::Storage(e) => &e.kind,
        other => panic!("expected storage error, got {}", other),
    }
}

#[tokio::test]
async fn test_filesystem_store_and_retrieve() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let data = b"Hello, world!";
    let reference = storage
        .store(data, &MediaMetadata::new(MediaType::Image, "image/png"))
        .await
        .unwrap();

    assert_eq!(reference.scheme(), Some("file"));
    let hash = content_hash(data);
    assert!(reference.as_str().ends_with(&format!(
        "images/{}/{}/{}",
        &hash[0..2],
        &hash[2..4],
        hash
    )));

    let retrieved = storage.retrieve(&reference).await.unwrap();
    assert_eq!(retrieved, data);
    assert!(storage.exists(&reference).await.unwrap());
}

#[tokio::test]
async fn test_filesystem_deduplicates_content() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();
    let metadata = MediaMetadata::new(MediaType::Audio, "audio/mpeg");

    let first = storage.store(b"Duplicate content", &metadata).await.unwrap();
    let second = storage.store(b"Duplicate content", &metadata).await.unwrap();
    assert_eq!(first, second);

    let hash = content_hash(b"Duplicate content");
    let dir = temp_dir
        .path()
        .join("audio")
        .join(&hash[0..2])
        .join(&hash[2..4]);
    let entries: Vec<_> = std::fs::read_dir(dir).unwrap().collect();
    assert_eq!(entries.len(), 1);
}

#[tokio::test]
async fn test_filesystem_detects_tampered_content() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let reference = storage
        .store(b"original", &MediaMetadata::new(MediaType::Image, "image/png"))
        .await
        .unwrap();
    std::fs::write(reference.path(), b"tampered").unwrap();

    let err = storage.retrieve(&reference).await.unwrap_err();
    assert!(matches!(storage_kind(&err), StorageErrorKind::FileRead(_)));
}

#[tokio::test]
async fn test_filesystem_delete_then_missing() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let reference = storage
        .store(b"{}", &MediaMetadata::new(MediaType::Manifest, "application/json"))
        .await
        .unwrap();
    storage.delete(&reference).await.unwrap();

    assert!(!storage.exists(&reference).await.unwrap());
    let err = storage.retrieve(&reference).await.unwrap_err();
    assert!(err.is_not_found());
}

#[tokio::test]
async fn test_filesystem_rejects_foreign_references() {
    let temp_dir = TempDir::new().unwrap();
    let storage = FileSystemStorage::new(temp_dir.path()).unwrap();

    let err = storage
        .retrieve(&MediaRef::new("memory://images/abc"))
        .await
        .unwrap_err();
    assert!(matches!(
        storage_kind(&err),
        StorageErrorKind::InvalidReference(_)
    ));

    let err = storage
        .retrieve(&MediaRef::new("file:///etc/passwd"))
        .await
        .unwrap_err();
    assert!(matches!(
        storage_kind(&err),
        StorageErrorKind::InvalidReference(_)
    ));
}

#[tokio::test]
async fn test_memory_store_is_content_addressed() {
    let storage = InMemoryStorage::new();
    let metadata = MediaMetadata::new(MediaType::Video, "video/mp4");

    let first = storage.store(b"clip", &metadata).await.unwrap();
    let second = storage.store(b"clip", &metadata).await.unwrap();
    assert_eq!(first, second);
    assert_eq!(
        first.as_str(),
        format!("memory://video/{}", content_hash(b"clip"))
    );
    assert_eq!(storage.len().await, 1);

    assert_eq!(storage.retrieve(&first).await.unwrap(), b"clip");
    storage.delete(&first).await.unwrap();
    assert!(storage.is_empty().await);
    assert!(storage.retrieve(&first).await.unwrap_err().is_not_found());
}
