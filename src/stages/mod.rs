//! Pipeline stages.
//!
//! A stage is one transform over the shared [`ScoringResult`]. Stages are
//! built from already-validated configuration, so a constructed stage is
//! always enabled; the orchestrator represents disabled stages separately.

pub mod content_purge;
pub mod relevance;

use async_trait::async_trait;
use thiserror::Error;

use crate::models::{ActivitySnapshot, ScoringResult};
use crate::providers::ProviderError;

pub use content_purge::ContentPurge;
pub use relevance::{FixedRelevanceTable, RelevanceEvaluation};

/// Errors that abort a stage, and with it the whole run.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("relevance scoring failed: {0}")]
    Provider(#[from] ProviderError),

    #[error("cannot apply relevance {relevance} to the reward of comment {comment_id}")]
    Arithmetic { comment_id: u64, relevance: f64 },
}

/// A single transform in the scoring pipeline.
#[async_trait]
pub trait Stage: Send + Sync {
    /// Name used in logs; matches the stage's configuration block.
    fn name(&self) -> &'static str;

    /// Consume the current result and return the updated one.
    ///
    /// On error the partially updated result is dropped, so callers never
    /// observe half-applied rewards.
    async fn transform(
        &self,
        snapshot: &ActivitySnapshot,
        result: ScoringResult,
    ) -> Result<ScoringResult, StageError>;
}
