//! Command-line interface module.

mod commands;
mod run;
mod segment;

pub use commands::{Cli, Commands};
pub use run::{RunOptions, run_story};
pub use segment::segment_file;

use std::path::Path;

use storyreel::StoryreelConfig;

/// Explicit `--config` file, or the layered defaults.
pub fn load_config(path: Option<&Path>) -> storyreel::StoryreelResult<StoryreelConfig> {
    match path {
        Some(path) => StoryreelConfig::from_file(path),
        None => StoryreelConfig::load(),
    }
}

/// Read a story file.
pub async fn read_story(path: &Path) -> Result<String, Box<dyn std::error::Error>> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| format!("Failed to read {}: {}", path.display(), e).into())
}
