//! Storyreel turns short stories into narrated, illustrated videos.
//!
//! This crate re-exports the workspace crates and adds what a deployment
//! needs around the pipeline core:
//! - [`StoryreelConfig`]: layered TOML configuration
//! - [`build_orchestrator`] and friends: collaborators chosen by configuration
//! - [`init_tracing`]: subscriber setup for the binary
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use storyreel::{InMemoryProjectRepository, StoryreelConfig, Submission, build_orchestrator};
//! use storyreel::{OwnerId, Project, ProjectRepository};
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = StoryreelConfig::load()?;
//! let repository = InMemoryProjectRepository::new();
//! let orchestrator = build_orchestrator(&config, Arc::new(repository.clone()))?;
//!
//! let project = Project::new_draft(OwnerId::new(), "The lonely dragon", None);
//! repository.create_project(&project).await?;
//!
//! let outcome = orchestrator
//!     .submit(Submission::new(
//!         *project.id(),
//!         *project.owner_id(),
//!         "A dragon wants friends. It flies over the village.",
//!     ))
//!     .await?;
//! println!("{}", outcome.artifact.reference());
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod config;
mod observability;
mod wiring;

pub use config::{
    ProviderBackend, ProvidersConfig, StorageBackend, StorageConfig, StoryreelConfig,
};
pub use observability::init_tracing;
pub use wiring::{build_assembler, build_orchestrator, build_providers, build_storage};

pub use storyreel_assembly::*;
pub use storyreel_core::*;
pub use storyreel_error::*;
pub use storyreel_interface::*;
pub use storyreel_models::*;
pub use storyreel_rate_limit::{ProviderLimits, RateLimiter, RetryConfig, Tier};
pub use storyreel_storage::*;
