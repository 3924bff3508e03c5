//! `storyreel run`.

use std::path::Path;
use std::sync::Arc;

use storyreel::{
    InMemoryProjectRepository, OwnerId, Project, ProjectRepository, StoryreelConfig, Submission,
    build_orchestrator,
};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

/// Options of one `run` invocation.
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Project title
    pub title: Option<String>,
    /// Owner of the created project
    pub owner: Option<OwnerId>,
}

/// Create a draft project, submit the story and print the outcome as JSON.
///
/// Ctrl-C cancels the submission; the project then ends in `error`.
pub async fn run_story(
    config: &StoryreelConfig,
    path: &Path,
    options: RunOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let story = super::read_story(path).await?;

    let repository = InMemoryProjectRepository::new();
    let orchestrator = build_orchestrator(config, Arc::new(repository.clone()))?;

    let title = options.title.unwrap_or_else(|| {
        path.file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_else(|| "Untitled story".to_string())
    });
    let project = Project::new_draft(options.owner.unwrap_or_default(), title, None);
    repository.create_project(&project).await?;
    info!(project_id = %project.id(), "Created draft project");

    let cancel = CancellationToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, cancelling submission");
            on_interrupt.cancel();
        }
    });

    let submission = Submission::new(*project.id(), *project.owner_id(), story);
    match orchestrator.submit_with_cancellation(submission, cancel).await {
        Ok(outcome) => {
            println!("{}", serde_json::to_string_pretty(&outcome)?);
            Ok(())
        }
        Err(e) => {
            error!(error = %e.kind, "Submission failed");
            let failed = repository.load_project(*project.id()).await?;
            println!("{}", serde_json::to_string_pretty(&failed)?);
            Err(e.into())
        }
    }
}
