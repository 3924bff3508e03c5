//! In-memory media storage for tests and ephemeral runs.

use std::collections::HashMap;
use std::sync::Arc;

use storyreel_core::MediaRef;
use storyreel_error::{StorageError, StorageErrorKind, StoryreelResult};
use tokio::sync::RwLock;

use crate::{MediaMetadata, MediaStorage, content_hash};

const SCHEME: &str = "memory";

/// Content-addressed storage held in a `HashMap`.
///
/// References look like `memory://{type}/{hash}`. All data is lost when the
/// last clone is dropped.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStorage {
    objects: Arc<RwLock<HashMap<MediaRef, Vec<u8>>>>,
}

impl InMemoryStorage {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored objects.
    pub async fn len(&self) -> usize {
        self.objects.read().await.len()
    }

    /// Whether nothing is stored.
    pub async fn is_empty(&self) -> bool {
        self.objects.read().await.is_empty()
    }

    fn check_scheme(reference: &MediaRef) -> StoryreelResult<()> {
        if reference.scheme() != Some(SCHEME) {
            return Err(StorageError::new(StorageErrorKind::InvalidReference(
                reference.to_string(),
            ))
            .into());
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl MediaStorage for InMemoryStorage {
    async fn store(&self, data: &[u8], metadata: &MediaMetadata) -> StoryreelResult<MediaRef> {
        let reference = MediaRef::new(format!(
            "{}://{}/{}",
            SCHEME,
            metadata.media_type.dir_name(),
            content_hash(data)
        ));
        self.objects
            .write()
            .await
            .entry(reference.clone())
            .or_insert_with(|| data.to_vec());
        tracing::debug!(reference = %reference, size = data.len(), "Stored media in memory");
        Ok(reference)
    }

    async fn retrieve(&self, reference: &MediaRef) -> StoryreelResult<Vec<u8>> {
        Self::check_scheme(reference)?;
        self.objects
            .read()
            .await
            .get(reference)
            .cloned()
            .ok_or_else(|| StorageError::new(StorageErrorKind::NotFound(reference.to_string())).into())
    }

    async fn delete(&self, reference: &MediaRef) -> StoryreelResult<()> {
        Self::check_scheme(reference)?;
        match self.objects.write().await.remove(reference) {
            Some(_) => Ok(()),
            None => Err(StorageError::new(StorageErrorKind::NotFound(reference.to_string())).into()),
        }
    }

    async fn exists(&self, reference: &MediaRef) -> StoryreelResult<bool> {
        Self::check_scheme(reference)?;
        Ok(self.objects.read().await.contains_key(reference))
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
