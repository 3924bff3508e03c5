//! Story-to-video pipeline core.
//!
//! - [`Segmenter`] splits story text into bounded, ordered segments
//! - [`DurationEstimator`] estimates how long a segment plays
//! - [`SegmentGenerator`] synthesizes the visual and narration of one segment
//! - [`ManifestAssembler`] and [`FfmpegAssembler`] combine generated segments
//!   into one artifact
//! - [`Orchestrator`] drives a project through
//!   `draft -> processing -> (completed | error)`
//!
//! [`InMemoryProjectRepository`] implements persistence for tests and
//! single-process runs.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod assembler;
mod config;
mod duration;
mod generator;
mod orchestrator;
mod repository;
mod segmenter;

pub use assembler::{FfmpegAssembler, ManifestAssembler, validate_assembly_input};
pub use config::{
    AssemblyBackend, AssemblyConfig, DurationConfig, GenerationConfig, PipelineConfig,
    SegmenterConfig, VideoQuality,
};
pub use duration::{DurationEstimator, estimate_duration};
pub use generator::SegmentGenerator;
pub use orchestrator::{Orchestrator, StartedSubmission, Submission, SubmissionOutcome};
pub use repository::InMemoryProjectRepository;
pub use segmenter::{Segmenter, segment_story};
