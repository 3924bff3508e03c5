//! JSON timeline assembler.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use serde::Serialize;
use storyreel_core::{Artifact, MediaRef, ProjectId, Segment, SegmentMedia};
use storyreel_error::{PipelineError, PipelineErrorKind, PipelineResult};
use storyreel_interface::Assembler;
use storyreel_storage::{MediaMetadata, MediaStorage, MediaType};
use tracing::{info, instrument};

use crate::{AssemblyConfig, VideoQuality, validate_assembly_input};

const BACKEND: &str = "manifest";

#[derive(Debug, Serialize)]
struct Manifest<'a> {
    project_id: ProjectId,
    created_at: chrono::DateTime<Utc>,
    quality: VideoQuality,
    total_duration_seconds: f64,
    transition: Transition,
    clips: Vec<Clip<'a>>,
}

#[derive(Debug, Serialize)]
struct Transition {
    kind: &'static str,
    duration_seconds: f64,
}

#[derive(Debug, Serialize)]
struct Clip<'a> {
    sequence_index: usize,
    start_seconds: f64,
    duration_seconds: f64,
    visual: &'a MediaRef,
    #[serde(skip_serializing_if = "Option::is_none")]
    narration: Option<&'a MediaRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    caption: Option<&'a str>,
}

/// Writes the ordered timeline of a project as a JSON manifest.
///
/// Clips start where the previous one ends; a crossfade of
/// `transition_seconds` joins adjacent clips. Captions carry the segment
/// text when subtitles are enabled.
#[derive(Clone)]
pub struct ManifestAssembler {
    config: AssemblyConfig,
    storage: Arc<dyn MediaStorage>,
}

impl ManifestAssembler {
    /// Create a manifest assembler writing to `storage`.
    pub fn new(config: AssemblyConfig, storage: Arc<dyn MediaStorage>) -> Self {
        Self { config, storage }
    }

    fn render(&self, project_id: ProjectId, media: &[SegmentMedia]) -> PipelineResult<Vec<u8>> {
        let mut start_seconds = 0.0;
        let clips = media
            .iter()
            .map(|segment| {
                let clip = Clip {
                    sequence_index: segment.sequence_index,
                    start_seconds,
                    duration_seconds: segment.duration_seconds,
                    visual: &segment.media_ref,
                    narration: segment.narration_ref.as_ref(),
                    caption: self
                        .config
                        .subtitles_enabled
                        .then_some(segment.content.as_str()),
                };
                start_seconds += segment.duration_seconds;
                clip
            })
            .collect();

        let manifest = Manifest {
            project_id,
            created_at: Utc::now(),
            quality: self.config.quality,
            total_duration_seconds: start_seconds,
            transition: Transition {
                kind: "crossfade",
                duration_seconds: self.config.transition_seconds,
            },
            clips,
        };

        serde_json::to_vec_pretty(&manifest).map_err(|e| {
            PipelineError::new(PipelineErrorKind::AssemblyFailed(format!(
                "manifest serialization: {}",
                e
            )))
        })
    }
}

#[async_trait]
impl Assembler for ManifestAssembler {
    #[instrument(skip(self, segments), fields(segments = segments.len()))]
    async fn assemble(
        &self,
        project_id: ProjectId,
        segments: &[Segment],
    ) -> PipelineResult<Artifact> {
        let media = validate_assembly_input(segments)?;
        let manifest = self.render(project_id, &media)?;

        let reference = self
            .storage
            .store(
                &manifest,
                &MediaMetadata::new(MediaType::Manifest, "application/json"),
            )
            .await
            .map_err(|e| {
                PipelineError::new(PipelineErrorKind::AssemblyFailed(format!(
                    "storing manifest: {}",
                    e
                )))
            })?;

        let artifact = Artifact::new(reference, project_id, BACKEND, &media);
        info!(
            %project_id,
            reference = %artifact.reference(),
            total_duration_seconds = artifact.total_duration_seconds(),
            "Assembled manifest"
        );
        Ok(artifact)
    }

    fn backend_name(&self) -> &'static str {
        BACKEND
    }
}
