//! Strictly Analysis - interactive ultimate tic-tac-toe analysis board.

#![warn(missing_docs)]

mod cli;
mod prompt;

use anyhow::{Context, Result};
use clap::Parser;
use cli::Cli;
use std::sync::Arc;
use strictly_analysis::{Analyzer, EngineConfig, MatchController, ProcessLauncher};
use tracing::{info, instrument};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,strictly_analysis=debug")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let launcher = Arc::new(ProcessLauncher::new(config.clone()));
    let analyzer = Analyzer::new(launcher, config.limits(), tokio::runtime::Handle::current());

    let (tx, rx) = tokio::sync::mpsc::unbounded_channel();
    let mut controller = MatchController::new(analyzer, tx);

    if let Some(script) = &cli.script {
        controller
            .load_hero(script)
            .with_context(|| format!("Failed to load script {:?}", script))?;
    }

    prompt::run(controller, rx).await
}

/// Builds the engine configuration: file, then environment, then flags.
#[instrument(skip_all, fields(config_path = %cli.config.display()))]
fn load_config(cli: &Cli) -> Result<EngineConfig> {
    let mut config = EngineConfig::load(&cli.config).context("Failed to load engine config")?;

    if let Some(engine) = &cli.engine {
        let command: Vec<String> = engine.split_whitespace().map(String::from).collect();
        config = config.with_command(command);
    }
    if let Some(limit) = &cli.limit {
        config = config.with_time_limit(limit.clone());
    }
    if let Some(table_mem) = &cli.table_mem {
        config = config.with_table_mem(table_mem.clone());
    }

    config.validate().context("Invalid engine config")?;
    info!(command = ?config.command(), time_limit = %config.time_limit(), "Engine configured");
    Ok(config)
}
