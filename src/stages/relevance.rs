//! Weights each comment's reward by how relevant it was to the issue.
//!
//! Comments whose role matches a configured multiplier get that fixed
//! relevance. Everything else is sent, per contributor, to a
//! [`RelevanceScorer`]. Contributors are evaluated concurrently on the
//! current task; the first failure aborts the stage.

use std::collections::HashMap;
use std::str::FromStr;
use std::sync::Arc;

use async_trait::async_trait;
use futures::future::try_join_all;
use rust_decimal::Decimal;

use super::{Stage, StageError};
use crate::config::stages::RELEVANCE;
use crate::config::{MultiplierConfig, RelevanceConfig};
use crate::constants::MAX_RELEVANCE_TOKENS;
use crate::models::{
    ActivitySnapshot, CommentScore, CommentType, ContributorRecord, ScoredComment, ScoringResult,
};
use crate::providers::{EvaluationComment, RelevanceRequest, RelevanceScorer, RelevanceScores};

/// Relevance used when neither the table nor the scorer provides one.
pub const DEFAULT_RELEVANCE: f64 = 1.0;

/// Placeholder score used when sizing the expected response.
const PLACEHOLDER_SCORE: f64 = 0.5;

/// Fixed relevance per encoded comment type.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FixedRelevanceTable(HashMap<CommentType, f64>);

impl FixedRelevanceTable {
    /// Build the table. Each entry's roles are OR-ed into one key; a later
    /// entry with the same key replaces an earlier one.
    pub fn from_multipliers(entries: &[MultiplierConfig]) -> Self {
        Self(
            entries
                .iter()
                .map(|entry| {
                    let key = entry
                        .role
                        .iter()
                        .fold(CommentType::default(), |acc, role| acc | CommentType::parse(role));
                    (key, entry.relevance)
                })
                .collect(),
        )
    }

    pub fn get(&self, comment_type: CommentType) -> Option<f64> {
        self.0.get(&comment_type).copied()
    }

    pub fn contains(&self, comment_type: CommentType) -> bool {
        self.0.contains_key(&comment_type)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// How the scorer's answer lined up with what was asked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub requested: usize,
    pub returned: usize,
    /// Requested ids the scorer did not return, in request order.
    pub missing: Vec<u64>,
}

impl Reconciliation {
    pub fn is_mismatch(&self) -> bool {
        self.requested != self.returned || !self.missing.is_empty()
    }
}

/// Compare returned scores against the requested comments.
pub fn reconcile(requested: &[EvaluationComment], scores: &RelevanceScores) -> Reconciliation {
    Reconciliation {
        requested: requested.len(),
        returned: scores.len(),
        missing: requested
            .iter()
            .map(|c| c.id)
            .filter(|id| !scores.contains_key(id))
            .collect(),
    }
}

/// Rough token count for `text`.
///
/// Runs of ASCII alphanumerics count one token per three characters and
/// every other non-whitespace character counts as its own token; a run of
/// whitespace is one token. This overestimates real BPE tokenizers on JSON,
/// which is the safe direction for an output budget.
pub fn estimate_tokens(text: &str) -> usize {
    let mut tokens: usize = 0;
    let mut word: usize = 0;
    let mut in_space = false;

    for ch in text.chars() {
        if ch.is_ascii_alphanumeric() {
            word += 1;
            in_space = false;
            continue;
        }
        tokens += word.div_ceil(3);
        word = 0;
        if ch.is_whitespace() {
            if !in_space {
                tokens += 1;
            }
            in_space = true;
        } else {
            tokens += 1;
            in_space = false;
        }
    }
    tokens + word.div_ceil(3)
}

/// Output budget for scoring `comments`: the size of a dummy response with
/// one placeholder entry per comment, capped at [`MAX_RELEVANCE_TOKENS`].
pub fn estimate_max_tokens(comments: &[EvaluationComment]) -> u64 {
    let dummy: serde_json::Map<String, serde_json::Value> = comments
        .iter()
        .map(|c| (c.id.to_string(), serde_json::Value::from(PLACEHOLDER_SCORE)))
        .collect();
    let json = serde_json::to_string_pretty(&dummy).unwrap_or_default();
    let estimate = estimate_tokens(&json).max(1) as u64;
    estimate.min(MAX_RELEVANCE_TOKENS)
}

/// Exact decimal form of a relevance value.
///
/// Goes through the shortest round-trip string (`0.1` stays `0.1`) rather
/// than the binary expansion of the float.
pub fn relevance_to_decimal(relevance: f64) -> Option<Decimal> {
    if !relevance.is_finite() {
        return None;
    }
    Decimal::from_str(&relevance.to_string()).ok()
}

/// `reward × relevance` in decimal arithmetic.
pub fn apply_relevance(reward: Decimal, relevance: f64) -> Option<Decimal> {
    reward.checked_mul(relevance_to_decimal(relevance)?)
}

/// Relevance evaluation stage.
pub struct RelevanceEvaluation {
    table: FixedRelevanceTable,
    scorer: Arc<dyn RelevanceScorer>,
}

impl RelevanceEvaluation {
    pub fn new(config: &RelevanceConfig, scorer: Arc<dyn RelevanceScorer>) -> Self {
        Self {
            table: FixedRelevanceTable::from_multipliers(&config.multipliers),
            scorer,
        }
    }

    pub fn table(&self) -> &FixedRelevanceTable {
        &self.table
    }

    /// Relevance for one comment: fixed table, then scorer, then default.
    fn resolve(&self, comment: &ScoredComment, scores: &RelevanceScores) -> f64 {
        self.table
            .get(comment.comment_type)
            .or_else(|| scores.get(&comment.id).copied())
            .unwrap_or(DEFAULT_RELEVANCE)
    }

    /// Score and reweight one contributor's comments.
    ///
    /// Nothing is written to `record` until every comment's relevance and
    /// new reward have been computed.
    async fn evaluate_contributor(
        &self,
        login: &str,
        record: &mut ContributorRecord,
        specification: &str,
        corpus: &[EvaluationComment],
    ) -> Result<(), StageError> {
        let to_evaluate: Vec<EvaluationComment> = record
            .comments
            .iter()
            .filter(|c| !self.table.contains(c.comment_type))
            .map(|c| EvaluationComment {
                id: c.id,
                comment: c.content.clone(),
                author: login.to_string(),
            })
            .collect();

        let scores = if to_evaluate.is_empty() {
            RelevanceScores::new()
        } else {
            let request = RelevanceRequest {
                specification_text: specification,
                all_comments: corpus,
                comments_to_evaluate: &to_evaluate,
            };
            let max_tokens = estimate_max_tokens(&to_evaluate);
            let scores = self.scorer.score(&request, max_tokens).await?;

            let report = reconcile(&to_evaluate, &scores);
            if report.is_mismatch() {
                tracing::error!(
                    contributor = login,
                    requested = report.requested,
                    returned = report.returned,
                    missing = ?report.missing,
                    "relevance count mismatch; missing comments default to {DEFAULT_RELEVANCE}"
                );
            }
            scores
        };

        let updates = record
            .comments
            .iter()
            .map(|comment| {
                let relevance = self.resolve(comment, &scores);
                apply_relevance(comment.reward(), relevance)
                    .map(|reward| (relevance, reward))
                    .ok_or(StageError::Arithmetic {
                        comment_id: comment.id,
                        relevance,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        for (comment, (relevance, reward)) in record.comments.iter_mut().zip(updates) {
            comment.score = Some(CommentScore {
                reward,
                relevance: Some(relevance),
            });
        }

        tracing::debug!(
            contributor = login,
            comments = record.comments.len(),
            evaluated = to_evaluate.len(),
            "relevance applied"
        );
        Ok(())
    }
}

/// Every purged comment in the result, tagged with its author.
fn flatten_comments(result: &ScoringResult) -> Vec<EvaluationComment> {
    result
        .iter()
        .flat_map(|(login, record)| {
            record.comments.iter().map(move |c| EvaluationComment {
                id: c.id,
                comment: c.content.clone(),
                author: login.clone(),
            })
        })
        .collect()
}

#[async_trait]
impl Stage for RelevanceEvaluation {
    fn name(&self) -> &'static str {
        RELEVANCE
    }

    async fn transform(
        &self,
        snapshot: &ActivitySnapshot,
        mut result: ScoringResult,
    ) -> Result<ScoringResult, StageError> {
        let specification = snapshot.specification_text.as_str();
        if specification.trim().is_empty() {
            tracing::debug!("no specification text; skipping relevance evaluation");
            return Ok(result);
        }

        let corpus = flatten_comments(&result);
        let evaluations = result
            .iter_mut()
            .filter(|(_, record)| !record.comments.is_empty())
            .map(|(login, record)| self.evaluate_contributor(login, record, specification, &corpus));
        try_join_all(evaluations).await?;

        Ok(result)
    }
}
