//! Config struct and loading logic.
//!
//! Priority (highest to lowest):
//! 1. Environment variables
//! 2. An explicit `--config` file, or `.kudos.toml` in the working directory
//! 3. `~/.config/kudos/config.toml` (global defaults)
//! 4. Built-in defaults

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use super::stages::RELEVANCE;
use crate::constants;
use crate::env::Env;

/// Errors during config loading and stage validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    ReadFile {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {source}")]
    ParseFile {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("stage '{0}' is not configured")]
    MissingStage(&'static str),

    #[error("invalid configuration for stage '{stage}': {reason}")]
    InvalidStage { stage: &'static str, reason: String },
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub provider: ProviderConfig,
    pub stages: StagesConfig,
}

/// Credentials for the relevance scoring service.
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
}

impl std::fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Raw, unvalidated stage blocks. A missing block leaves its stage disabled.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct StagesConfig {
    pub content_purge: Option<toml::Table>,
    pub relevance: Option<toml::Table>,
}

impl Config {
    /// Load configuration with proper layering.
    ///
    /// When `explicit` is given it must exist; otherwise `.kudos.toml` in
    /// `workdir` is used if present.
    pub fn load(explicit: Option<&Path>, workdir: &Path, env: &Env) -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                config.merge(Self::load_file(&global_path)?);
            }
        }

        match explicit {
            Some(path) => config.merge(Self::load_file(path)?),
            None => {
                let local_path = workdir.join(constants::CONFIG_FILENAME);
                if local_path.exists() {
                    config.merge(Self::load_file(&local_path)?);
                }
            }
        }

        config.apply_env_vars(env);

        Ok(config)
    }

    /// Load a config from a specific file.
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::ParseFile {
            path: path.to_path_buf(),
            source: e,
        })
    }

    fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(constants::CONFIG_DIR).join("config.toml"))
    }

    /// Merge another config into this one. Blocks present in `other`
    /// replace ours wholesale; stage blocks are never merged key by key.
    fn merge(&mut self, other: Config) {
        if other.provider.api_key.is_some() {
            self.provider.api_key = other.provider.api_key;
        }
        if other.stages.content_purge.is_some() {
            self.stages.content_purge = other.stages.content_purge;
        }
        if other.stages.relevance.is_some() {
            self.stages.relevance = other.stages.relevance;
        }
    }

    /// Apply environment variable overrides.
    ///
    /// Model and endpoint overrides only patch an existing relevance block;
    /// they never enable the stage on their own.
    fn apply_env_vars(&mut self, env: &Env) {
        if let Some(key) = env.first_of(&[constants::ENV_API_KEY, constants::ENV_OPENAI_API_KEY]) {
            self.provider.api_key = Some(key);
        }

        let model = env.var(constants::ENV_MODEL);
        let endpoint = env.var(constants::ENV_ENDPOINT);
        if model.is_none() && endpoint.is_none() {
            return;
        }

        let Some(relevance) = self.stages.relevance.as_mut() else {
            tracing::debug!(
                "ignoring model/endpoint environment overrides: stage '{RELEVANCE}' is not configured"
            );
            return;
        };
        // Patch whichever spelling the block already uses; adding the other
        // would make the table a duplicate field.
        let key = if relevance.contains_key("openAi") {
            "openAi"
        } else {
            "openai"
        };
        let openai = relevance
            .entry(key)
            .or_insert_with(|| toml::Value::Table(toml::Table::new()));
        if let toml::Value::Table(openai) = openai {
            if let Some(model) = model {
                openai.insert("model".into(), toml::Value::String(model));
            }
            if let Some(endpoint) = endpoint {
                openai.insert("endpoint".into(), toml::Value::String(endpoint));
            }
        }
    }
}
