//! Core domain types for the Storyreel pipeline.
//!
//! This crate provides the data types shared by every Storyreel crate:
//! identifiers, projects and their status lifecycle, segments, generated
//! segment media and the assembled artifact.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod artifact;
mod ids;
mod media;
mod project;
mod segment;
mod status;

pub use artifact::Artifact;
pub use ids::{OwnerId, ProjectId, SegmentId};
pub use media::MediaRef;
pub use project::{FailureRecord, Project};
pub use segment::{NewSegment, Segment, SegmentMedia, SegmentMediaUpdate};
pub use status::ProjectStatus;
