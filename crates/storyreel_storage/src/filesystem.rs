//! Filesystem-based media storage implementation.
//!
//! This backend stores media files in a content-addressable filesystem structure,
//! organized by media type and content hash for automatic deduplication.

use std::path::{Path, PathBuf};

use storyreel_core::MediaRef;
use storyreel_error::{StorageError, StorageErrorKind, StoryreelResult};
use uuid::Uuid;

use crate::{MediaMetadata, MediaStorage, MediaType, content_hash};

const SCHEME: &str = "file";

/// Filesystem storage backend.
///
/// Stores media files in a content-addressable structure:
/// `{base_path}/{type}/{hash[0:2]}/{hash[2:4]}/{hash}`
///
/// ```text
/// /var/storyreel/media/
/// ├── images/
/// │   └── ab/
/// │       └── cd/
/// │           └── abcdef123456...  (PNG file)
/// ├── audio/
/// │   └── 12/
/// │       └── 34/
/// │           └── 123456abcdef...  (MP3 file)
/// └── manifests/
///     └── ef/
///         └── 01/
///             └── ef01234567...    (JSON timeline)
/// ```
///
/// References are `file://` URIs holding the absolute path. Writes go to a
/// uniquely named temp file that is renamed into place.
#[derive(Debug, Clone)]
pub struct FileSystemStorage {
    base_path: PathBuf,
}

impl FileSystemStorage {
    /// Create a new filesystem storage backend.
    ///
    /// Creates the base directory if it doesn't exist.
    ///
    /// # Errors
    ///
    /// Returns error if the directory cannot be created or resolved.
    #[tracing::instrument(skip(base_path))]
    pub fn new(base_path: impl Into<PathBuf>) -> StoryreelResult<Self> {
        let base_path = base_path.into();

        std::fs::create_dir_all(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        let base_path = std::path::absolute(&base_path).map_err(|e| {
            StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                "{}: {}",
                base_path.display(),
                e
            )))
        })?;

        tracing::info!(path = %base_path.display(), "Created filesystem storage");
        Ok(Self { base_path })
    }

    /// Root directory of the store.
    pub fn base_path(&self) -> &Path {
        &self.base_path
    }

    fn get_path(&self, hash: &str, media_type: MediaType) -> PathBuf {
        self.base_path
            .join(media_type.dir_name())
            .join(&hash[0..2])
            .join(&hash[2..4])
            .join(hash)
    }

    fn reference_for(path: &Path) -> MediaRef {
        MediaRef::new(format!("{}://{}", SCHEME, path.display()))
    }

    /// Resolve a reference to a path inside this store.
    fn resolve(&self, reference: &MediaRef) -> StoryreelResult<PathBuf> {
        if reference.scheme() != Some(SCHEME) {
            return Err(StorageError::new(StorageErrorKind::InvalidReference(
                reference.to_string(),
            ))
            .into());
        }

        let path = PathBuf::from(reference.path());
        if !path.starts_with(&self.base_path) {
            return Err(StorageError::new(StorageErrorKind::InvalidReference(format!(
                "{} is outside {}",
                reference,
                self.base_path.display()
            )))
            .into());
        }
        Ok(path)
    }

    fn verify_hash(data: &[u8], path: &Path) -> StoryreelResult<()> {
        let expected = path.file_name().and_then(|n| n.to_str()).unwrap_or_default();
        let actual = content_hash(data);
        if actual != expected {
            return Err(StorageError::new(StorageErrorKind::FileRead(format!(
                "Hash mismatch for {}: got {}",
                path.display(),
                actual
            )))
            .into());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MediaStorage for FileSystemStorage {
    #[tracing::instrument(skip(self, data, metadata), fields(size = data.len(), media_type = %metadata.media_type))]
    async fn store(&self, data: &[u8], metadata: &MediaMetadata) -> StoryreelResult<MediaRef> {
        let hash = content_hash(data);
        let path = self.get_path(&hash, metadata.media_type);

        // Same content, same path
        if tokio::fs::try_exists(&path).await.unwrap_or(false) {
            tracing::debug!(
                hash = %hash,
                path = %path.display(),
                "Media already exists, returning existing reference"
            );
            return Ok(Self::reference_for(&path));
        }

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(|e| {
                StorageError::new(StorageErrorKind::DirectoryCreation(format!(
                    "{}: {}",
                    parent.display(),
                    e
                )))
            })?;
        }

        let temp_path = path.with_extension(format!("{}.tmp", Uuid::new_v4().simple()));
        tokio::fs::write(&temp_path, data).await.map_err(|e| {
            StorageError::new(StorageErrorKind::FileWrite(format!(
                "{}: {}",
                temp_path.display(),
                e
            )))
        })?;

        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(StorageError::new(StorageErrorKind::FileWrite(format!(
                "rename {} to {}: {}",
                temp_path.display(),
                path.display(),
                e
            )))
            .into());
        }

        tracing::info!(
            hash = %hash,
            path = %path.display(),
            size = data.len(),
            media_type = %metadata.media_type,
            "Stored media file"
        );

        Ok(Self::reference_for(&path))
    }

    #[tracing::instrument(skip(self, reference), fields(reference = %reference))]
    async fn retrieve(&self, reference: &MediaRef) -> StoryreelResult<Vec<u8>> {
        let path = self.resolve(reference)?;

        let data = tokio::fs::read(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(reference.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileRead(format!(
                    "{}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        Self::verify_hash(&data, &path)?;

        tracing::debug!(path = %path.display(), size = data.len(), "Retrieved media file");
        Ok(data)
    }

    #[tracing::instrument(skip(self, reference), fields(reference = %reference))]
    async fn delete(&self, reference: &MediaRef) -> StoryreelResult<()> {
        let path = self.resolve(reference)?;

        tokio::fs::remove_file(&path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                StorageError::new(StorageErrorKind::NotFound(reference.to_string()))
            } else {
                StorageError::new(StorageErrorKind::FileWrite(format!(
                    "delete {}: {}",
                    path.display(),
                    e
                )))
            }
        })?;

        tracing::info!(path = %path.display(), "Deleted media file");
        Ok(())
    }

    async fn exists(&self, reference: &MediaRef) -> StoryreelResult<bool> {
        let path = self.resolve(reference)?;
        Ok(tokio::fs::try_exists(path).await.unwrap_or(false))
    }

    fn backend_name(&self) -> &'static str {
        "filesystem"
    }
}
