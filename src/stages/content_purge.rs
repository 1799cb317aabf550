//! Turns raw comment bodies into single-line text worth scoring.

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;

use super::{Stage, StageError};
use crate::config::ContentPurgeConfig;
use crate::config::stages::CONTENT_PURGE;
use crate::models::{ActivitySnapshot, ScoredComment, ScoringResult};

static HTML_COMMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?s)<!--.*?-->").unwrap());

/// Quoted replies: any line starting with `>`. CRLF mode makes `\r`,
/// `\n` and `\r\n` all end a line.
static QUOTE_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mR)^>.*$").unwrap());

/// Bot commands: any line starting with `/`.
static COMMAND_LINE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?mR)^/.*$").unwrap());

static LINE_BREAKS_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[\r\n]+").unwrap());

/// Strip markup that carries no contribution and flatten to one line.
pub fn purge(body: &str) -> String {
    let text = HTML_COMMENT_RE.replace_all(body, "");
    let text = QUOTE_LINE_RE.replace_all(&text, "");
    let text = COMMAND_LINE_RE.replace_all(&text, "");
    let text = LINE_BREAKS_RE.replace_all(&text, " ");
    text.trim().to_string()
}

/// Seeds each known contributor's record with their purged comments.
#[derive(Debug, Clone, Default)]
pub struct ContentPurge {
    _config: ContentPurgeConfig,
}

impl ContentPurge {
    pub fn new(config: ContentPurgeConfig) -> Self {
        Self { _config: config }
    }

    /// Append purged comments to `result` in snapshot order.
    ///
    /// Comments without an author or body, from authors not present in
    /// `result`, or that purge to nothing are skipped.
    pub fn apply(&self, snapshot: &ActivitySnapshot, result: &mut ScoringResult) -> usize {
        let mut added = 0;
        for comment in &snapshot.comments {
            let Some(login) = comment.author_login.as_deref().filter(|l| !l.is_empty()) else {
                continue;
            };
            let Some(body) = comment.body.as_deref() else {
                continue;
            };
            let Some(record) = result.get_mut(login) else {
                tracing::trace!(comment = comment.id, login, "author is not a known contributor");
                continue;
            };

            let content = purge(body);
            if content.is_empty() {
                continue;
            }
            record.comments.push(ScoredComment {
                id: comment.id,
                content,
                url: comment.url.clone(),
                comment_type: comment.origin_type,
                score: None,
            });
            added += 1;
        }
        added
    }
}

#[async_trait]
impl Stage for ContentPurge {
    fn name(&self) -> &'static str {
        CONTENT_PURGE
    }

    async fn transform(
        &self,
        snapshot: &ActivitySnapshot,
        mut result: ScoringResult,
    ) -> Result<ScoringResult, StageError> {
        let added = self.apply(snapshot, &mut result);
        tracing::debug!(
            raw = snapshot.comments.len(),
            purged = added,
            "content purge complete"
        );
        Ok(result)
    }
}
