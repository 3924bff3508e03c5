//! CLI command definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use storyreel::OwnerId;

/// Storyreel - turn short stories into narrated, illustrated videos
#[derive(Parser, Debug)]
#[command(name = "storyreel")]
#[command(about = "Turn short stories into narrated, illustrated videos", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Configuration file replacing the user and working-directory files
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the segments of a story with estimated durations
    Segment {
        /// Path to the story text file
        file: PathBuf,

        /// Override the maximum segment length in characters
        #[arg(long)]
        max_length: Option<usize>,
    },

    /// Turn a story into a video through the configured pipeline
    Run {
        /// Path to the story text file
        file: PathBuf,

        /// Project title (defaults to the file name)
        #[arg(long)]
        title: Option<String>,

        /// Owner id (a fresh one when omitted)
        #[arg(long)]
        owner: Option<OwnerId>,
    },
}
