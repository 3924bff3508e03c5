//! Error types for the Storyreel pipeline.
//!
//! This crate provides the foundation error types used throughout the Storyreel workspace.
//!
//! # Error Hierarchy
//!
//! All errors follow the `ErrorKind` + wrapper struct pattern:
//! - `*ErrorKind` enum defines specific error conditions
//! - `*Error` struct wraps the kind with source location tracking
//! - All constructors use `#[track_caller]` for automatic location capture
//!
//! # Examples
//!
//! ```
//! use storyreel_error::{PipelineError, PipelineErrorKind, StoryreelResult};
//!
//! fn submit() -> StoryreelResult<()> {
//!     Err(PipelineError::new(PipelineErrorKind::InvalidInput(
//!         "story text is empty".to_string(),
//!     )))?
//! }
//!
//! match submit() {
//!     Ok(()) => println!("submitted"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod error;
mod pipeline;
mod provider;
mod storage;

pub use config::ConfigError;
pub use error::{StoryreelError, StoryreelErrorKind, StoryreelResult};
pub use pipeline::{PipelineError, PipelineErrorKind, PipelineResult};
pub use provider::{ProviderError, ProviderErrorKind, ProviderResult, RetryableError};
pub use storage::{StorageError, StorageErrorKind};
