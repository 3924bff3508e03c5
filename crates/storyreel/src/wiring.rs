//! Builds the pipeline collaborators a configuration selects.

use std::sync::Arc;

use storyreel_assembly::{
    AssemblyBackend, AssemblyConfig, DurationEstimator, FfmpegAssembler, ManifestAssembler,
    Orchestrator, SegmentGenerator,
};
use storyreel_error::StoryreelResult;
use storyreel_interface::{Assembler, NarrationProvider, ProjectRepository, VisualProvider};
use storyreel_models::{
    ElevenLabsNarrationProvider, FakeNarrationProvider, FakeVisualProvider, OpenAiImageProvider,
};
use storyreel_storage::{FileSystemStorage, InMemoryStorage, MediaStorage};
use tracing::info;

use crate::{ProviderBackend, ProvidersConfig, StorageBackend, StorageConfig, StoryreelConfig};

/// Open the configured media storage.
///
/// # Errors
///
/// Returns an error if the filesystem root cannot be created.
pub fn build_storage(config: &StorageConfig) -> StoryreelResult<Arc<dyn MediaStorage>> {
    let storage: Arc<dyn MediaStorage> = match config.backend {
        StorageBackend::Filesystem => Arc::new(FileSystemStorage::new(config.base_path())?),
        StorageBackend::Memory => Arc::new(InMemoryStorage::new()),
    };
    info!(backend = storage.backend_name(), "Media storage ready");
    Ok(storage)
}

/// Create the visual and narration providers of the configured backend.
///
/// Live providers read their API keys from the environment; a missing key
/// surfaces on the first call.
pub fn build_providers(
    config: &ProvidersConfig,
    storage: Arc<dyn MediaStorage>,
) -> (Arc<dyn VisualProvider>, Arc<dyn NarrationProvider>) {
    info!(backend = %config.backend, "Creating media providers");
    match config.backend {
        ProviderBackend::Fake => (
            Arc::new(FakeVisualProvider::new()),
            Arc::new(FakeNarrationProvider::new()),
        ),
        ProviderBackend::Live => (
            Arc::new(OpenAiImageProvider::from_env(
                config.visual.clone(),
                Arc::clone(&storage),
            )),
            Arc::new(ElevenLabsNarrationProvider::from_env(
                config.narration.clone(),
                storage,
            )),
        ),
    }
}

/// Create the configured assembly backend.
pub fn build_assembler(
    config: &AssemblyConfig,
    storage: Arc<dyn MediaStorage>,
) -> Arc<dyn Assembler> {
    match config.backend {
        AssemblyBackend::Manifest => Arc::new(ManifestAssembler::new(config.clone(), storage)),
        AssemblyBackend::Ffmpeg => Arc::new(FfmpegAssembler::new(config.clone(), storage)),
    }
}

/// Wire storage, providers, generator and assembler into an orchestrator.
///
/// # Errors
///
/// Returns an error if media storage cannot be opened.
pub fn build_orchestrator(
    config: &StoryreelConfig,
    repository: Arc<dyn ProjectRepository>,
) -> StoryreelResult<Orchestrator> {
    let pipeline = config.pipeline();
    let storage = build_storage(&config.storage)?;
    let (visual, narration) = build_providers(&config.providers, Arc::clone(&storage));

    let generator = SegmentGenerator::new(
        pipeline.generation.clone(),
        DurationEstimator::new(pipeline.duration.clone()),
        visual,
        narration,
    )
    .with_visual_limits(config.providers.visual_limits.clone())
    .with_narration_limits(config.providers.narration_limits.clone());

    let assembler = build_assembler(&pipeline.assembly, storage);
    Ok(Orchestrator::from_config(
        &pipeline, repository, generator, assembler,
    ))
}
