//! App-wide constants.
//!
//! Centralises the tool name, config paths and environment variable names
//! so a rename only requires changing this file.

/// Display name of the tool (lowercase).
pub const APP_NAME: &str = "kudos";

/// Crate version, as reported by `--version`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local config filename (e.g. `.kudos.toml` in the working directory).
pub const CONFIG_FILENAME: &str = ".kudos.toml";

/// Directory name under `~/.config/` for global config.
pub const CONFIG_DIR: &str = "kudos";

/// Hard ceiling on the completion budget requested from the relevance model.
pub const MAX_RELEVANCE_TOKENS: u64 = 16384;

// ── Environment variable names ──────────────────────────────────────

pub const ENV_API_KEY: &str = "KUDOS_API_KEY";
pub const ENV_MODEL: &str = "KUDOS_MODEL";
pub const ENV_ENDPOINT: &str = "KUDOS_ENDPOINT";

/// Provider-specific fallback for the API key.
pub const ENV_OPENAI_API_KEY: &str = "OPENAI_API_KEY";
