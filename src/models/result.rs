//! The keyed result structure every pipeline stage reads and writes.

use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::role::CommentType;

/// Per-contributor scoring state, keyed by login.
///
/// Populated with one (possibly empty) record per known contributor before
/// the pipeline runs, then mutated by each enabled stage.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScoringResult(IndexMap<String, ContributorRecord>);

impl ScoringResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a contributor with an empty record if not already present.
    pub fn add_contributor(&mut self, login: impl Into<String>) -> &mut ContributorRecord {
        self.0.entry(login.into()).or_default()
    }

    pub fn get(&self, login: &str) -> Option<&ContributorRecord> {
        self.0.get(login)
    }

    pub fn get_mut(&mut self, login: &str) -> Option<&mut ContributorRecord> {
        self.0.get_mut(login)
    }

    pub fn contains(&self, login: &str) -> bool {
        self.0.contains_key(login)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &ContributorRecord)> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut ContributorRecord)> {
        self.0.iter_mut()
    }

    /// Total number of scored comments across all contributors.
    pub fn comment_count(&self) -> usize {
        self.0.values().map(|r| r.comments.len()).sum()
    }
}

impl<K: Into<String>> FromIterator<(K, ContributorRecord)> for ScoringResult {
    fn from_iter<I: IntoIterator<Item = (K, ContributorRecord)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v)).collect())
    }
}

/// Everything accumulated for one contributor.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ContributorRecord {
    #[serde(default)]
    pub comments: Vec<ScoredComment>,
    /// Aggregate reward, owned by stages outside this crate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<Decimal>,
    /// Fields written by other stages, carried through untouched.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// A purged comment and, once scored, its reward.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredComment {
    pub id: u64,
    /// Purged plain text, not the raw body.
    pub content: String,
    pub url: String,
    #[serde(rename = "type")]
    pub comment_type: CommentType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<CommentScore>,
}

impl ScoredComment {
    /// Reward established before relevance weighting, or zero.
    pub fn reward(&self) -> Decimal {
        self.score.as_ref().map_or(Decimal::ZERO, |s| s.reward)
    }

    pub fn relevance(&self) -> Option<f64> {
        self.score.as_ref().and_then(|s| s.relevance)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CommentScore {
    #[serde(default)]
    pub reward: Decimal,
    /// Set only by relevance evaluation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relevance: Option<f64>,
}
