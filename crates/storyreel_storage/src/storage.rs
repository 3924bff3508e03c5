//! Storage trait and media descriptors.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use storyreel_core::MediaRef;
use storyreel_error::StoryreelResult;

/// Kind of stored media, which also selects its storage directory.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum MediaType {
    /// Still images
    Image,
    /// Narration audio
    Audio,
    /// Rendered video
    Video,
    /// JSON assembly manifests
    Manifest,
}

impl MediaType {
    /// Directory name under the storage root.
    pub fn dir_name(&self) -> &'static str {
        match self {
            MediaType::Image => "images",
            MediaType::Audio => "audio",
            MediaType::Video => "video",
            MediaType::Manifest => "manifests",
        }
    }

    /// Parse a directory name back into a media type.
    pub fn from_dir_name(dir: &str) -> Option<Self> {
        match dir {
            "images" => Some(MediaType::Image),
            "audio" => Some(MediaType::Audio),
            "video" => Some(MediaType::Video),
            "manifests" => Some(MediaType::Manifest),
            _ => None,
        }
    }
}

/// Metadata about media being stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MediaMetadata {
    /// Type of media
    pub media_type: MediaType,
    /// MIME type (e.g., "image/png", "video/mp4")
    pub mime_type: String,
}

impl MediaMetadata {
    /// Create metadata for a media type and MIME type.
    pub fn new(media_type: MediaType, mime_type: impl Into<String>) -> Self {
        Self {
            media_type,
            mime_type: mime_type.into(),
        }
    }
}

/// Hex-encoded SHA-256 of `data`.
pub fn content_hash(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    format!("{:x}", hasher.finalize())
}

/// Trait for pluggable media storage backends.
#[async_trait]
pub trait MediaStorage: Send + Sync {
    /// Store media and return its reference.
    ///
    /// Identical content yields the identical reference. A store either
    /// completes or leaves nothing visible under the returned reference.
    async fn store(&self, data: &[u8], metadata: &MediaMetadata) -> StoryreelResult<MediaRef>;

    /// Retrieve media by reference.
    ///
    /// Fails with `NotFound` for unknown references and `InvalidReference`
    /// for references another backend issued.
    async fn retrieve(&self, reference: &MediaRef) -> StoryreelResult<Vec<u8>>;

    /// Delete media by reference.
    async fn delete(&self, reference: &MediaRef) -> StoryreelResult<()>;

    /// Check if media exists.
    async fn exists(&self, reference: &MediaRef) -> StoryreelResult<bool>;

    /// Backend name (e.g., "filesystem", "memory").
    fn backend_name(&self) -> &'static str;
}
