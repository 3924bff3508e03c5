//! Trait definitions for the Storyreel pipeline.
//!
//! This crate defines the seams between the pipeline core and its
//! collaborators: persistence, media synthesis providers and assembly
//! backends.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assembler;
mod provider;
mod repository;

pub use assembler::Assembler;
pub use provider::{NarrationProvider, VisualProvider};
pub use repository::ProjectRepository;
