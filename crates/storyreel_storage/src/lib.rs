//! Content-addressable media storage for Storyreel.
//!
//! Providers store the images and narration audio they synthesize here, and
//! assemblers store the final artifact. Every stored object is addressed by
//! the SHA-256 of its content, so storing the same bytes twice yields the same
//! [`MediaRef`](storyreel_core::MediaRef).
//!
//! # Example
//!
//! ```rust
//! use storyreel_storage::{InMemoryStorage, MediaMetadata, MediaStorage, MediaType};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let storage = InMemoryStorage::new();
//! let metadata = MediaMetadata::new(MediaType::Image, "image/png");
//!
//! let reference = storage.store(b"png bytes", &metadata).await?;
//! assert_eq!(storage.retrieve(&reference).await?, b"png bytes");
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod filesystem;
mod memory;
mod storage;

pub use filesystem::FileSystemStorage;
pub use memory::InMemoryStorage;
pub use storage::{MediaMetadata, MediaStorage, MediaType, content_hash};
