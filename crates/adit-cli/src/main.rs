//! ADIT CLI - Main entry point

use adit_cli::{Cli, Commands};
use adit_common::logging::{init_logging, LogConfig, LogLevel};
use clap::Parser;
use std::process;
use tracing::error;

#[tokio::main]
async fn main() {
    // Pick up a .env file when present; real environment wins
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let mut log_config = LogConfig::from_env().unwrap_or_default();
    if cli.verbose {
        log_config.level = LogLevel::Debug;
    }

    // The CLI should keep working even if logging cannot initialize
    let _ = init_logging(&log_config);

    if let Err(e) = execute_command(&cli).await {
        error!(error = %e, "Command failed");
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

/// Execute the CLI command
async fn execute_command(cli: &Cli) -> adit_common::Result<()> {
    match &cli.command {
        Commands::InitBatch {
            volume,
            batch_set_id,
            pipeline,
        } => adit_cli::commands::init::run(volume, batch_set_id, pipeline).await,

        Commands::Validate { volume } => adit_cli::commands::validate::run(volume).await,

        Commands::Classify { identifier, target } => {
            adit_cli::commands::classify::run(identifier, target).await
        },
    }
}
