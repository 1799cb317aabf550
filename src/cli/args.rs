//! Clap argument types.

use clap::Parser;
use std::path::PathBuf;

/// Relevance-weighted contributor rewards for issue threads.
#[derive(Parser, Debug)]
#[command(name = kudos::constants::APP_NAME, version = kudos::constants::VERSION)]
pub struct Cli {
    /// Log at debug level unless RUST_LOG says otherwise.
    #[arg(long, short, global = true, default_value_t = false)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr.
    #[arg(long, global = true, default_value_t = false)]
    pub log_json: bool,

    /// Config file to use instead of `.kudos.toml` in the working directory.
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(clap::Subcommand, Debug)]
pub enum Command {
    /// Run the scoring pipeline over a snapshot and a pre-populated result.
    Score(ScoreArgs),

    /// Show which stages the current configuration enables.
    Validate,
}

/// Arguments for the `score` subcommand.
#[derive(Parser, Debug)]
pub struct ScoreArgs {
    /// JSON file with the activity snapshot.
    #[arg(long)]
    pub snapshot: PathBuf,

    /// JSON file with the result to score, keyed by contributor login.
    #[arg(long)]
    pub result: PathBuf,

    /// Write the scored result here instead of stdout.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}
