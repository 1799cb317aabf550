//! kudos: relevance-weighted contributor rewards.
//!
//! Entry point and error handling boundary. Uses `anyhow` for
//! ergonomic error propagation and user-facing messages.

mod cli;

use kudos::config;
use kudos::env;
use kudos::models;
use kudos::orchestrator;
use kudos::telemetry;

use std::path::Path;
use std::process;

use anyhow::{Context, Result};
use clap::Parser;

use cli::args::{Cli, Command, ScoreArgs};
use config::Config;
use env::Env;
use models::{ActivitySnapshot, ScoringResult};
use orchestrator::{Pipeline, PipelineEntry};

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("Error: {err:#}");
        process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    telemetry::init(if cli.verbose { "debug" } else { "info" }, cli.log_json);

    let workdir = std::env::current_dir().context("failed to determine working directory")?;
    let config = Config::load(cli.config.as_deref(), &workdir, &Env::real())
        .context("failed to load configuration")?;

    match cli.command {
        Command::Score(args) => run_score(args, &config).await,
        Command::Validate => run_validate(&config),
    }
}

/// Score a snapshot and write the resulting JSON.
async fn run_score(args: ScoreArgs, config: &Config) -> Result<()> {
    let snapshot: ActivitySnapshot = read_json(&args.snapshot)?;
    let result: ScoringResult = read_json(&args.result)?;

    let pipeline = Pipeline::from_config(config);
    let scored = pipeline
        .run(&snapshot, result)
        .await
        .context("scoring run aborted")?;

    let json = serde_json::to_string_pretty(&scored).context("failed to serialize result")?;
    match args.output {
        Some(path) => std::fs::write(&path, json)
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{json}"),
    }
    Ok(())
}

/// Report which stages the configuration enables.
fn run_validate(config: &Config) -> Result<()> {
    let pipeline = Pipeline::from_config(config);
    for entry in pipeline.entries() {
        match entry {
            PipelineEntry::Enabled(_) => println!("{:<14} enabled", entry.name()),
            PipelineEntry::Disabled { name, reason } => {
                println!("{name:<14} disabled ({reason})")
            }
        }
    }
    Ok(())
}

fn read_json<T: serde::de::DeserializeOwned>(path: &Path) -> Result<T> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse {}", path.display()))
}
