// SPDX-FileCopyrightText: 2026 Convoqa Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Convoqa - incremental conversation analysis warehouse.
//!
//! This is the binary entry point.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use convoqa::{Runtime, commands, serve};
use convoqa_config::ConvoqaConfig;

/// Convoqa - incremental conversation analysis warehouse.
#[derive(Parser, Debug)]
#[command(name = "convoqa", version, about, long_about = None)]
struct Cli {
    /// Explicit config file instead of the XDG search path.
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP control surface.
    Serve,
    /// Ingest (unless skipped) and run one analysis batch.
    Analyze,
    /// Pull records from the configured source into the warehouse.
    Ingest,
    /// Recalculate metrics for every ticket.
    Metrics,
    /// Compute daily ticket snapshots.
    Snapshot {
        /// Date as YYYY-MM-DD; defaults to today in the business-local offset.
        #[arg(long)]
        date: Option<NaiveDate>,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let loaded = match &cli.config {
        Some(path) => convoqa_config::load_and_validate_path(path),
        None => convoqa_config::load_and_validate(),
    };
    let config = match loaded {
        Ok(config) => config,
        Err(errors) => {
            convoqa_config::render_errors(&errors);
            std::process::exit(1);
        }
    };

    let Some(command) = cli.command else {
        println!("convoqa: use --help for available commands");
        return;
    };

    init_tracing(&config.agent.log_level);

    if let Err(e) = run(command, config).await {
        tracing::error!(error = %e, "command failed");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: ConvoqaConfig) -> Result<(), convoqa_core::ConvoqaError> {
    let runtime = Runtime::build(config).await?;
    if let Commands::Serve = command {
        return serve::run_serve(runtime).await;
    }

    let result = match command {
        Commands::Analyze => commands::run_analyze(&runtime).await.map(drop),
        Commands::Ingest => commands::run_ingest(&runtime).await.map(drop),
        Commands::Metrics => commands::run_metrics(&runtime).await.map(drop),
        Commands::Snapshot { date } => commands::run_snapshot(&runtime, date).await.map(drop),
        Commands::Serve => Ok(()),
    };
    runtime.shutdown().await?;
    result
}

fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("convoqa={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
