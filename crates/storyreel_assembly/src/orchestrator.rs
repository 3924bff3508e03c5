//! End-to-end submission pipeline.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use storyreel_core::{
    Artifact, FailureRecord, NewSegment, OwnerId, Project, ProjectId, Segment, SegmentId,
};
use storyreel_error::{PipelineError, PipelineErrorKind, PipelineResult, StoryreelError};
use storyreel_interface::{Assembler, ProjectRepository};
use tokio::sync::Semaphore;
use tokio::task::{JoinError, JoinHandle, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, instrument, warn};

use crate::{PipelineConfig, SegmentGenerator, Segmenter};

const DEFAULT_MAX_CONCURRENT: usize = 4;
const DEFAULT_ASSEMBLY_TIMEOUT: Duration = Duration::from_secs(600);

/// A request to turn story text into a video for a project.
///
/// The owner travels with every submission; the pipeline never looks up who
/// is calling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    /// Target project
    pub project_id: ProjectId,
    /// User submitting the story
    pub owner_id: OwnerId,
    /// Raw story text
    pub story_text: String,
}

impl Submission {
    /// Create a submission.
    pub fn new(project_id: ProjectId, owner_id: OwnerId, story_text: impl Into<String>) -> Self {
        Self {
            project_id,
            owner_id,
            story_text: story_text.into(),
        }
    }
}

/// Result of a successful submission.
#[derive(Debug, Clone, Serialize)]
pub struct SubmissionOutcome {
    /// Project in `completed` status
    pub project: Project,
    /// Generated segments, by sequence order
    pub segments: Vec<Segment>,
    /// Assembled artifact
    pub artifact: Artifact,
}

/// A submission whose generation and assembly continue in the background.
#[derive(Debug)]
pub struct StartedSubmission {
    /// Project as it entered `processing`
    pub project: Project,
    /// Segment records as created, before generation
    pub segments: Vec<Segment>,
    /// Cancels the background work
    pub cancel: CancellationToken,
    handle: JoinHandle<PipelineResult<SubmissionOutcome>>,
}

impl StartedSubmission {
    /// Wait for the background work to finish.
    ///
    /// # Errors
    ///
    /// The pipeline error. A pipeline task that panicked or was aborted has
    /// already moved the project to `error` and surfaces as `AssemblyFailed`
    /// or `Cancelled`.
    pub async fn wait(self) -> PipelineResult<SubmissionOutcome> {
        self.handle.await.unwrap_or_else(|e| Err(abnormal_exit(&e)))
    }
}

/// Error for a pipeline task that did not return.
#[track_caller]
fn abnormal_exit(error: &JoinError) -> PipelineError {
    if error.is_cancelled() {
        cancelled()
    } else {
        PipelineError::new(PipelineErrorKind::AssemblyFailed(format!(
            "pipeline task panicked: {}",
            error
        )))
    }
}

#[track_caller]
fn persistence(error: StoryreelError) -> PipelineError {
    PipelineError::new(PipelineErrorKind::PersistenceFailed(error.to_string()))
}

#[track_caller]
fn cancelled() -> PipelineError {
    PipelineError::new(PipelineErrorKind::Cancelled)
}

/// Shared handles one generation task needs.
#[derive(Clone)]
struct GenerationTask {
    generator: Arc<SegmentGenerator>,
    repository: Arc<dyn ProjectRepository>,
    slots: Arc<Semaphore>,
    cancel: CancellationToken,
}

impl GenerationTask {
    /// Generate one segment and persist its media.
    ///
    /// Checks for cancellation before taking a slot, before calling the
    /// providers and while they run. A real failure cancels the siblings
    /// before the slot is released, so no waiting sibling starts after it.
    async fn run(
        self,
        segment_id: SegmentId,
        sequence_index: usize,
        content: String,
    ) -> PipelineResult<Segment> {
        let _slot = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(cancelled()),
            slot = Arc::clone(&self.slots).acquire_owned() => slot.map_err(|_| cancelled())?,
        };

        let result = self.generate(segment_id, sequence_index, &content).await;
        if let Err(e) = &result {
            if !matches!(e.kind, PipelineErrorKind::Cancelled) {
                warn!(sequence_index, error = %e.kind, "Segment generation failed, cancelling siblings");
                self.cancel.cancel();
            }
        }
        result
    }

    async fn generate(
        &self,
        segment_id: SegmentId,
        sequence_index: usize,
        content: &str,
    ) -> PipelineResult<Segment> {
        if self.cancel.is_cancelled() {
            return Err(cancelled());
        }

        let media = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => return Err(cancelled()),
            media = self.generator.generate(content, sequence_index) => media?,
        };

        self.repository
            .update_segment_media(segment_id, &media.to_update())
            .await
            .map_err(|e| {
                PipelineError::new(PipelineErrorKind::PersistenceFailed(format!(
                    "segment {}: {}",
                    sequence_index, e
                )))
            })
    }
}

/// Drives projects through `draft -> processing -> (completed | error)`.
///
/// The orchestrator is the only writer of project status. Validation errors
/// leave the project untouched; every later failure moves it to `error` with
/// a failure record before the error is returned.
#[derive(Clone)]
pub struct Orchestrator {
    repository: Arc<dyn ProjectRepository>,
    segmenter: Segmenter,
    generator: Arc<SegmentGenerator>,
    assembler: Arc<dyn Assembler>,
    max_concurrent: usize,
    assembly_timeout: Duration,
}

impl Orchestrator {
    /// Create an orchestrator with default concurrency and assembly timeout.
    pub fn new(
        repository: Arc<dyn ProjectRepository>,
        segmenter: Segmenter,
        generator: SegmentGenerator,
        assembler: Arc<dyn Assembler>,
    ) -> Self {
        Self {
            repository,
            segmenter,
            generator: Arc::new(generator),
            assembler,
            max_concurrent: DEFAULT_MAX_CONCURRENT,
            assembly_timeout: DEFAULT_ASSEMBLY_TIMEOUT,
        }
    }

    /// Create an orchestrator whose segmenter and limits come from `config`.
    pub fn from_config(
        config: &PipelineConfig,
        repository: Arc<dyn ProjectRepository>,
        generator: SegmentGenerator,
        assembler: Arc<dyn Assembler>,
    ) -> Self {
        Self::new(
            repository,
            Segmenter::new(config.segmentation.clone()),
            generator,
            assembler,
        )
        .with_max_concurrent(config.generation.max_concurrent)
        .with_assembly_timeout(config.assembly.timeout())
    }

    /// Bound the number of segments generated at once.
    pub fn with_max_concurrent(mut self, max_concurrent: usize) -> Self {
        self.max_concurrent = max_concurrent.max(1);
        self
    }

    /// Bound the assembly step.
    pub fn with_assembly_timeout(mut self, timeout: Duration) -> Self {
        self.assembly_timeout = timeout;
        self
    }

    /// The persistence collaborator.
    pub fn repository(&self) -> &Arc<dyn ProjectRepository> {
        &self.repository
    }

    /// Run the whole pipeline and wait for it.
    ///
    /// # Errors
    ///
    /// - `InvalidInput` for blank story text, an unknown project, an owner
    ///   mismatch or a project that is `processing` or `completed`; the
    ///   project is not changed
    /// - any other pipeline error after the project was moved to `error`
    #[instrument(skip(self, submission), fields(project_id = %submission.project_id))]
    pub async fn submit(&self, submission: Submission) -> PipelineResult<SubmissionOutcome> {
        self.submit_with_cancellation(submission, CancellationToken::new())
            .await
    }

    /// Run the whole pipeline, stopping early when `cancel` fires.
    ///
    /// A cancelled submission ends with the project in `error` and a
    /// `Cancelled` error.
    ///
    /// # Errors
    ///
    /// See [`submit`](Self::submit).
    #[instrument(skip(self, submission, cancel), fields(project_id = %submission.project_id))]
    pub async fn submit_with_cancellation(
        &self,
        submission: Submission,
        cancel: CancellationToken,
    ) -> PipelineResult<SubmissionOutcome> {
        let (project, segments) = self.prepare(&submission).await?;
        self.drive(project, segments, cancel).await
    }

    /// Validate, segment and persist, then continue in the background.
    ///
    /// Returns as soon as the segment records exist. Generation and assembly
    /// run on a spawned task under a supervisor; if that task panics or is
    /// aborted the supervisor moves the project to `error`.
    ///
    /// # Errors
    ///
    /// Errors of the synchronous part; see [`submit`](Self::submit).
    #[instrument(skip(self, submission), fields(project_id = %submission.project_id))]
    pub async fn start(&self, submission: Submission) -> PipelineResult<StartedSubmission> {
        let (project, segments) = self.prepare(&submission).await?;
        let cancel = CancellationToken::new();

        let driver = tokio::spawn({
            let orchestrator = self.clone();
            let project = project.clone();
            let segments = segments.clone();
            let cancel = cancel.clone();
            async move { orchestrator.drive(project, segments, cancel).await }
        });

        let project_id = *project.id();
        let orchestrator = self.clone();
        let handle = tokio::spawn(async move {
            match driver.await {
                Ok(result) => result,
                Err(e) => {
                    error!(%project_id, error = %e, "Pipeline task ended abnormally");
                    Err(orchestrator
                        .fail_project(project_id, abnormal_exit(&e), Vec::new())
                        .await)
                }
            }
        });

        Ok(StartedSubmission {
            project,
            segments,
            cancel,
            handle,
        })
    }

    /// Validation, `processing` transition, segmentation and segment persistence.
    async fn prepare(&self, submission: &Submission) -> PipelineResult<(Project, Vec<Segment>)> {
        let project_id = submission.project_id;

        if submission.story_text.trim().is_empty() {
            return Err(PipelineError::invalid_input("story text is empty"));
        }

        let mut project = match self.repository.load_project(project_id).await {
            Ok(project) => project,
            Err(e) if e.is_not_found() => {
                return Err(PipelineError::invalid_input(format!(
                    "unknown project {}",
                    project_id
                )));
            }
            Err(e) => return Err(persistence(e)),
        };

        if *project.owner_id() != submission.owner_id {
            return Err(PipelineError::invalid_input(format!(
                "project {} does not belong to owner {}",
                project_id, submission.owner_id
            )));
        }

        project.begin_submission(submission.story_text.clone())?;
        let project = self
            .repository
            .update_project(&project)
            .await
            .map_err(persistence)?;
        info!(attempt = project.attempt(), "Project entered processing");

        let texts = match self.segmenter.segment(&submission.story_text) {
            Ok(texts) => texts,
            Err(e) => return Err(self.fail_project(project_id, e, Vec::new()).await),
        };

        let attempt = *project.attempt();
        let new_segments = texts
            .into_iter()
            .enumerate()
            .map(|(sequence_order, content)| NewSegment {
                project_id,
                attempt,
                sequence_order,
                content,
            })
            .collect();

        let segments = match self.repository.insert_segments(new_segments).await {
            Ok(segments) => segments,
            Err(e) => return Err(self.fail_project(project_id, persistence(e), Vec::new()).await),
        };
        info!(segments = segments.len(), attempt, "Segments persisted");

        Ok((project, segments))
    }

    /// Generation, assembly and the final transition.
    async fn drive(
        &self,
        project: Project,
        segments: Vec<Segment>,
        cancel: CancellationToken,
    ) -> PipelineResult<SubmissionOutcome> {
        let project_id = *project.id();

        let generated = match self.generate_all(&segments, &cancel).await {
            Ok(generated) => generated,
            Err((e, failed_segments)) => {
                return Err(self.fail_project(project_id, e, failed_segments).await);
            }
        };

        if cancel.is_cancelled() {
            return Err(self.fail_project(project_id, cancelled(), Vec::new()).await);
        }

        let assembled = tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(cancelled()),
            result = tokio::time::timeout(
                self.assembly_timeout,
                self.assembler.assemble(project_id, &generated),
            ) => match result {
                Ok(result) => result,
                Err(_) => Err(PipelineError::new(PipelineErrorKind::AssemblyFailed(format!(
                    "{} assembly timed out after {:?}",
                    self.assembler.backend_name(),
                    self.assembly_timeout
                )))),
            },
        };
        let artifact = match assembled {
            Ok(artifact) => artifact,
            Err(e) => return Err(self.fail_project(project_id, e, Vec::new()).await),
        };

        let mut project = project;
        if let Err(e) = project.complete(artifact.reference().clone()) {
            return Err(self.fail_project(project_id, e, Vec::new()).await);
        }
        let project = match self.repository.update_project(&project).await {
            Ok(project) => project,
            Err(e) => return Err(self.fail_project(project_id, persistence(e), Vec::new()).await),
        };

        info!(
            %project_id,
            artifact = %artifact.reference(),
            total_duration_seconds = artifact.total_duration_seconds(),
            "Project completed"
        );

        Ok(SubmissionOutcome {
            project,
            segments: generated,
            artifact,
        })
    }

    /// Generate every segment with bounded concurrency.
    ///
    /// The first real failure cancels the siblings that are waiting or
    /// running; segments already generated stay persisted. On failure returns
    /// the error of the lowest failing index and all failing indices.
    async fn generate_all(
        &self,
        segments: &[Segment],
        cancel: &CancellationToken,
    ) -> Result<Vec<Segment>, (PipelineError, Vec<usize>)> {
        let siblings = cancel.child_token();
        let task = GenerationTask {
            generator: Arc::clone(&self.generator),
            repository: Arc::clone(&self.repository),
            slots: Arc::new(Semaphore::new(self.max_concurrent)),
            cancel: siblings.clone(),
        };

        let mut tasks = JoinSet::new();
        for segment in segments {
            let task = task.clone();
            let segment_id = *segment.id();
            let sequence_index = *segment.sequence_order();
            let content = segment.content().clone();
            tasks.spawn(async move {
                let outcome = task.run(segment_id, sequence_index, content).await;
                (sequence_index, outcome)
            });
        }

        let mut generated = Vec::with_capacity(segments.len());
        let mut failures: Vec<(usize, PipelineError)> = Vec::new();
        let mut reported = HashSet::new();

        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((sequence_index, Ok(segment))) => {
                    reported.insert(sequence_index);
                    generated.push(segment);
                }
                Ok((sequence_index, Err(e))) => {
                    reported.insert(sequence_index);
                    if !matches!(e.kind, PipelineErrorKind::Cancelled) {
                        siblings.cancel();
                    }
                    failures.push((sequence_index, e));
                }
                Err(e) => {
                    error!(error = %e, "Generation task ended abnormally");
                    siblings.cancel();
                }
            }
        }

        for segment in segments {
            let sequence_index = *segment.sequence_order();
            if !reported.contains(&sequence_index) {
                failures.push((
                    sequence_index,
                    PipelineError::new(PipelineErrorKind::GenerationFailed {
                        sequence_index,
                        provider: "pipeline".to_string(),
                        message: "generation task panicked".to_string(),
                    }),
                ));
            }
        }

        let mut real: Vec<(usize, PipelineError)> = failures
            .iter()
            .filter(|(_, e)| !matches!(e.kind, PipelineErrorKind::Cancelled))
            .cloned()
            .collect();
        if !real.is_empty() {
            real.sort_by_key(|(sequence_index, _)| *sequence_index);
            let failed_segments = real.iter().map(|(i, _)| *i).collect();
            let (_, first) = real.swap_remove(0);
            return Err((first, failed_segments));
        }
        if !failures.is_empty() || cancel.is_cancelled() {
            return Err((cancelled(), Vec::new()));
        }

        generated.sort_by_key(|s| *s.sequence_order());
        Ok(generated)
    }

    /// Move the project to `error` and hand back `error`.
    ///
    /// Reloads the project so the failure lands on the latest version. A
    /// failure to persist the transition is logged; the original error wins.
    async fn fail_project(
        &self,
        project_id: ProjectId,
        error: PipelineError,
        failed_segments: Vec<usize>,
    ) -> PipelineError {
        let record = FailureRecord::new(error.kind.name(), error.kind.to_string())
            .with_failed_segments(failed_segments);
        warn!(%project_id, kind = %record.kind, failed_segments = ?record.failed_segments, "Project failed");

        let result = async {
            let mut project = self.repository.load_project(project_id).await?;
            project.fail(record)?;
            self.repository.update_project(&project).await?;
            Ok::<_, StoryreelError>(())
        }
        .await;

        if let Err(e) = result {
            error!(%project_id, error = %e, "Could not record project failure");
        }
        error
    }
}
