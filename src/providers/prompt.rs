//! Prompt construction for relevance scoring.

use super::{EvaluationComment, ProviderError, RelevanceRequest};

/// System prompt shared by every relevance call.
pub const SYSTEM_PROMPT: &str = "\
You are a maintainer evaluating how much individual comments contributed to \
resolving a GitHub issue. You are given the issue specification, the full \
conversation for context, and a list of comments to evaluate.\n\n\
For each comment to evaluate, assign a relevance score between 0 and 1:\n\
- 1 means the comment directly moves the issue toward resolution \
(clarifies requirements, proposes or reviews a solution, reports a result).\n\
- 0 means the comment is off-topic, spam, or adds nothing.\n\n\
Respond with a single JSON object mapping each comment id (as a string) to \
its score, for example {\"123\": 0.8, \"456\": 0.1}. Include every id you \
were asked to evaluate and nothing else. Do not add prose or markdown.";

/// Build the user prompt for one batch.
///
/// An empty specification means the caller skipped its own input checks;
/// that is a contract violation, not a case to score around.
pub fn build_user_prompt(request: &RelevanceRequest<'_>) -> Result<String, ProviderError> {
    if request.specification_text.trim().is_empty() {
        return Err(ProviderError::InvalidRequest(
            "specification text is empty".to_string(),
        ));
    }

    let mut prompt = String::new();

    prompt.push_str("## Issue Specification\n\n");
    prompt.push_str(request.specification_text.trim());
    prompt.push_str("\n\n");

    prompt.push_str("## Conversation\n\n```json\n");
    prompt.push_str(&comments_json(request.all_comments));
    prompt.push_str("\n```\n\n");

    prompt.push_str("## Comments To Evaluate\n\n```json\n");
    prompt.push_str(&comments_json(request.comments_to_evaluate));
    prompt.push_str("\n```\n\n");

    let ids: Vec<String> = request
        .comments_to_evaluate
        .iter()
        .map(|c| c.id.to_string())
        .collect();
    prompt.push_str(&format!(
        "## Instructions\n\n\
         Return a JSON object with exactly {} entries, one for each of these ids: {}.\n",
        ids.len(),
        ids.join(", ")
    ));

    Ok(prompt)
}

fn comments_json(comments: &[EvaluationComment]) -> String {
    serde_json::to_string_pretty(comments).unwrap_or_else(|_| "[]".to_string())
}
