//! Storyreel CLI binary.
//!
//! - Preview how a story is segmented
//! - Run a story through the configured pipeline

use clap::Parser;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, RunOptions, load_config, run_story, segment_file};

    // Provider API keys may live in .env
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    storyreel::init_tracing(cli.verbose, cli.log_json);

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Segment { file, max_length } => {
            segment_file(&config, &file, max_length).await?;
        }

        Commands::Run { file, title, owner } => {
            run_story(&config, &file, RunOptions { title, owner }).await?;
        }
    }

    Ok(())
}
