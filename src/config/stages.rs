//! Typed, validated configuration for each pipeline stage.
//!
//! [`Config`](super::Config) keeps every stage block as a raw TOML table.
//! A stage is only ever constructed from the output of one of the
//! `validate` functions here; a block that fails validation disables its
//! stage instead of aborting the run.

use serde::{Deserialize, Serialize};

use super::loader::ConfigError;
use crate::models::{CommentType, role};

/// Name of the content purge block under `[stages]`.
pub const CONTENT_PURGE: &str = "content_purge";

/// Name of the relevance evaluation block under `[stages]`.
pub const RELEVANCE: &str = "relevance";

/// Content purge takes no options; only the presence of a well-formed
/// block matters.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ContentPurgeConfig {}

impl ContentPurgeConfig {
    pub fn validate(raw: Option<&toml::Table>) -> Result<Self, ConfigError> {
        parse_block(CONTENT_PURGE, raw)
    }
}

/// Relevance evaluation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RelevanceConfig {
    #[serde(alias = "openAi")]
    pub openai: OpenAiConfig,
    #[serde(default)]
    pub multipliers: Vec<MultiplierConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OpenAiConfig {
    /// Base URL of an OpenAI-compatible API. Defaults to OpenAI itself.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    pub model: String,
}

/// One fixed relevance entry: every role in `role` is OR-ed into a single
/// table key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct MultiplierConfig {
    pub role: Vec<String>,
    pub relevance: f64,
}

impl RelevanceConfig {
    pub fn validate(raw: Option<&toml::Table>) -> Result<Self, ConfigError> {
        let config: Self = parse_block(RELEVANCE, raw)?;

        if config.openai.model.trim().is_empty() {
            return Err(invalid(RELEVANCE, "openai.model must not be empty"));
        }
        if let Some(endpoint) = &config.openai.endpoint {
            if endpoint.trim().is_empty() {
                return Err(invalid(RELEVANCE, "openai.endpoint must not be empty when set"));
            }
        }

        for (i, entry) in config.multipliers.iter().enumerate() {
            if entry.role.is_empty() {
                return Err(invalid(RELEVANCE, format!("multipliers[{i}].role is empty")));
            }
            if !entry.relevance.is_finite() || entry.relevance < 0.0 {
                return Err(invalid(
                    RELEVANCE,
                    format!(
                        "multipliers[{i}].relevance must be a non-negative number, got {}",
                        entry.relevance
                    ),
                ));
            }
            for name in &entry.role {
                let unknown = role::unknown_parts(name);
                if !unknown.is_empty() {
                    tracing::warn!(
                        role = %name,
                        ?unknown,
                        "multiplier role contains unrecognized parts; they will be ignored"
                    );
                }
            }
            let key = entry
                .role
                .iter()
                .fold(CommentType::default(), |acc, name| acc | CommentType::parse(name));
            if key.is_empty() {
                tracing::warn!(
                    index = i,
                    "multiplier has no recognized roles; it only matches untyped comments"
                );
            }
        }

        Ok(config)
    }
}

fn parse_block<T>(stage: &'static str, raw: Option<&toml::Table>) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
{
    let raw = raw.ok_or(ConfigError::MissingStage(stage))?;
    toml::Value::Table(raw.clone())
        .try_into()
        .map_err(|e: toml::de::Error| invalid(stage, e.message()))
}

fn invalid(stage: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::InvalidStage {
        stage,
        reason: reason.into(),
    }
}
