//! RelevanceScorer trait and LLM integration.
//!
//! Provides an abstraction layer over rig-core so stages depend only on
//! "score these comments against this specification", never on a
//! specific LLM library.

pub mod prompt;
pub mod rig;

use std::collections::HashMap;

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

/// Errors from the relevance scoring service.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("LLM API error: {0}")]
    ApiError(String),

    #[error("failed to parse LLM response: {0}")]
    ParseError(String),

    #[error("provider not configured: {0}")]
    NotConfigured(String),

    #[error("invalid relevance request: {0}")]
    InvalidRequest(String),
}

/// A comment as presented to the scoring service.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EvaluationComment {
    pub id: u64,
    pub comment: String,
    pub author: String,
}

/// Everything the scoring service sees for one contributor batch.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RelevanceRequest<'a> {
    pub specification_text: &'a str,
    /// Every purged comment in the thread, for context.
    pub all_comments: &'a [EvaluationComment],
    /// The comments that need a score.
    pub comments_to_evaluate: &'a [EvaluationComment],
}

/// Relevance per comment id, each in `[0, 1]`.
pub type RelevanceScores = HashMap<u64, f64>;

/// Trait for natural-language relevance scoring.
///
/// Implementations handle prompt construction, the network call and
/// response validation. A response that cannot be decoded into
/// [`RelevanceScores`] is an error, never an empty map.
#[async_trait]
pub trait RelevanceScorer: Send + Sync {
    /// Score `request.comments_to_evaluate`, asking for at most
    /// `max_tokens` of output.
    async fn score(
        &self,
        request: &RelevanceRequest<'_>,
        max_tokens: u64,
    ) -> Result<RelevanceScores, ProviderError>;
}
