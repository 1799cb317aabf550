//! Pipeline orchestrator: builds the fixed stage list from configuration
//! and threads one result through every enabled stage.

use std::sync::Arc;

use thiserror::Error;

use crate::config::stages::{CONTENT_PURGE, RELEVANCE};
use crate::config::{Config, ContentPurgeConfig, RelevanceConfig};
use crate::models::{ActivitySnapshot, ScoringResult};
use crate::providers::rig::RigScorer;
use crate::providers::{ProviderError, RelevanceScorer};
use crate::stages::{ContentPurge, RelevanceEvaluation, Stage, StageError};

/// Errors from a pipeline run.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("stage '{stage}' failed: {source}")]
    Stage {
        stage: &'static str,
        #[source]
        source: StageError,
    },
}

/// One slot in the pipeline.
pub enum PipelineEntry {
    Enabled(Box<dyn Stage>),
    /// A stage whose configuration did not validate. Never invoked.
    Disabled { name: &'static str, reason: String },
}

impl PipelineEntry {
    fn disabled(name: &'static str, reason: impl Into<String>) -> Self {
        let reason = reason.into();
        tracing::warn!(stage = name, %reason, "stage disabled");
        Self::Disabled { name, reason }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Enabled(stage) => stage.name(),
            Self::Disabled { name, .. } => *name,
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Enabled(_))
    }
}

/// Ordered list of stages: content purge first, then relevance evaluation,
/// which reads purged content.
pub struct Pipeline {
    entries: Vec<PipelineEntry>,
}

impl Pipeline {
    /// Build from configuration using the rig-core scorer.
    ///
    /// Relevance evaluation is disabled when its block is invalid or when
    /// no API key is available.
    pub fn from_config(config: &Config) -> Self {
        Self::build(config, |relevance| {
            let scorer = RigScorer::new(&relevance.openai, &config.provider)?;
            Ok(Arc::new(scorer) as Arc<dyn RelevanceScorer>)
        })
    }

    /// Build from configuration with a caller-supplied scorer.
    pub fn with_scorer(config: &Config, scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self::build(config, |_| Ok(scorer))
    }

    fn build<F>(config: &Config, make_scorer: F) -> Self
    where
        F: FnOnce(&RelevanceConfig) -> Result<Arc<dyn RelevanceScorer>, ProviderError>,
    {
        let content_purge = match ContentPurgeConfig::validate(config.stages.content_purge.as_ref())
        {
            Ok(purge) => PipelineEntry::Enabled(Box::new(ContentPurge::new(purge))),
            Err(e) => PipelineEntry::disabled(CONTENT_PURGE, e.to_string()),
        };

        let relevance = match RelevanceConfig::validate(config.stages.relevance.as_ref()) {
            Ok(relevance) => match make_scorer(&relevance) {
                Ok(scorer) => {
                    let stage = RelevanceEvaluation::new(&relevance, scorer);
                    if stage.table().is_empty() {
                        tracing::debug!("no fixed multipliers; every comment is scored by the model");
                    } else {
                        tracing::debug!(
                            multipliers = stage.table().len(),
                            "fixed relevance table built"
                        );
                    }
                    PipelineEntry::Enabled(Box::new(stage))
                }
                Err(e) => PipelineEntry::disabled(RELEVANCE, e.to_string()),
            },
            Err(e) => PipelineEntry::disabled(RELEVANCE, e.to_string()),
        };

        Self::new(vec![content_purge, relevance])
    }

    /// Assemble a pipeline from explicit entries, run in the given order.
    pub fn new(entries: Vec<PipelineEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[PipelineEntry] {
        &self.entries
    }

    /// Names of the stages that will run, in order.
    pub fn enabled_stages(&self) -> Vec<&'static str> {
        self.entries
            .iter()
            .filter(|e| e.is_enabled())
            .map(PipelineEntry::name)
            .collect()
    }

    /// Run every enabled stage over `result` and return the final result.
    ///
    /// The first stage error aborts the run; no partial result is returned.
    pub async fn run(
        &self,
        snapshot: &ActivitySnapshot,
        mut result: ScoringResult,
    ) -> Result<ScoringResult, PipelineError> {
        for entry in &self.entries {
            match entry {
                PipelineEntry::Enabled(stage) => {
                    tracing::debug!(stage = stage.name(), "running stage");
                    result = stage.transform(snapshot, result).await.map_err(|source| {
                        PipelineError::Stage {
                            stage: stage.name(),
                            source,
                        }
                    })?;
                }
                PipelineEntry::Disabled { name, .. } => {
                    tracing::debug!(stage = name, "skipping disabled stage");
                }
            }
        }

        tracing::info!(
            contributors = result.len(),
            comments = result.comment_count(),
            "scoring pipeline complete"
        );
        Ok(result)
    }
}
