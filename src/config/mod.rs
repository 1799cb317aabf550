//! Configuration loading, layering and per-stage validation.
//!
//! Handles `.kudos.toml` loading, environment variable resolution, and
//! turning raw stage blocks into validated stage configuration.

pub mod loader;
pub mod stages;

pub use loader::{Config, ConfigError, ProviderConfig, StagesConfig};
pub use stages::{ContentPurgeConfig, MultiplierConfig, OpenAiConfig, RelevanceConfig};
