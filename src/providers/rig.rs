//! rig-core integration for LLM-backed relevance scoring.
//!
//! Talks to OpenAI or any OpenAI-compatible endpoint through rig-core's
//! completions client. A single best-effort call is made per batch;
//! failures are surfaced to the caller unchanged.

use async_trait::async_trait;
use rig::client::CompletionClient;
use rig::completion::Prompt;
use rig::providers;

use crate::config::{OpenAiConfig, ProviderConfig};

use super::prompt::{SYSTEM_PROMPT, build_user_prompt};
use super::{ProviderError, RelevanceRequest, RelevanceScorer, RelevanceScores};

/// Maximum length of LLM response text to include in parse error messages.
const PARSE_ERROR_PREVIEW_LEN: usize = 2000;

/// rig-core based relevance scorer.
pub struct RigScorer {
    api_key: String,
    model: String,
    endpoint: Option<String>,
}

impl RigScorer {
    /// Create a scorer, failing early when no API key is configured.
    pub fn new(openai: &OpenAiConfig, provider: &ProviderConfig) -> Result<Self, ProviderError> {
        let api_key = provider.api_key.clone().ok_or_else(|| {
            ProviderError::NotConfigured(format!(
                "no API key found for the relevance model. Set {} or {}.",
                crate::constants::ENV_API_KEY,
                crate::constants::ENV_OPENAI_API_KEY
            ))
        })?;
        Ok(Self {
            api_key,
            model: openai.model.clone(),
            endpoint: openai.endpoint.clone(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn build_client(&self) -> Result<providers::openai::CompletionsClient, ProviderError> {
        let mut builder = providers::openai::CompletionsClient::builder().api_key(self.api_key.as_str());
        if let Some(ref endpoint) = self.endpoint {
            builder = builder.base_url(endpoint);
        }
        let client: providers::openai::CompletionsClient = builder
            .build()
            .map_err(|e| ProviderError::ApiError(format!("failed to create OpenAI client: {e}")))?;
        Ok(client)
    }

    /// Make a completion call through rig-core and return the raw response text.
    async fn call_rig(&self, user_prompt: &str, max_tokens: u64) -> Result<String, ProviderError> {
        let client = self.build_client()?;
        let agent = client
            .agent(self.model.as_str())
            .preamble(SYSTEM_PROMPT)
            .temperature(0.0)
            .max_tokens(max_tokens)
            .build();
        agent
            .prompt(user_prompt)
            .await
            .map_err(|e| ProviderError::ApiError(format!("OpenAI API error: {e}")))
    }
}

#[async_trait]
impl RelevanceScorer for RigScorer {
    async fn score(
        &self,
        request: &RelevanceRequest<'_>,
        max_tokens: u64,
    ) -> Result<RelevanceScores, ProviderError> {
        let prompt = build_user_prompt(request)?;
        tracing::debug!(
            model = %self.model,
            comments = request.comments_to_evaluate.len(),
            max_tokens,
            "requesting relevance scores"
        );
        let response = self.call_rig(&prompt, max_tokens).await?;
        parse_relevance_response(&response)
    }
}

/// Parse the LLM response text into relevance scores.
///
/// The response must contain a JSON object mapping integer comment ids
/// (as strings) to finite numbers in `[0, 1]`. Some models wrap the
/// object in markdown fences or prose, so candidate slices are tried in
/// turn. The first candidate that decodes as an object decides the
/// outcome: invalid keys or values fail the whole response.
pub fn parse_relevance_response(response: &str) -> Result<RelevanceScores, ProviderError> {
    let trimmed = response.trim();

    if trimmed.is_empty() {
        return Err(ProviderError::ParseError("empty response".to_string()));
    }

    for candidate in extract_json_candidates(trimmed) {
        if let Ok(object) =
            serde_json::from_str::<serde_json::Map<String, serde_json::Value>>(&candidate)
        {
            return validate_scores(object);
        }
    }

    Err(ProviderError::ParseError(format!(
        "could not parse LLM response as a relevance object. Response: {}",
        preview(response)
    )))
}

fn validate_scores(
    object: serde_json::Map<String, serde_json::Value>,
) -> Result<RelevanceScores, ProviderError> {
    let mut scores = RelevanceScores::with_capacity(object.len());
    for (key, value) in object {
        let id: u64 = key.trim().parse().map_err(|_| {
            ProviderError::ParseError(format!("comment id '{key}' is not an integer"))
        })?;
        let score = value
            .as_f64()
            .filter(|v| v.is_finite() && (0.0..=1.0).contains(v))
            .ok_or_else(|| {
                ProviderError::ParseError(format!(
                    "relevance for comment {id} must be a number in [0, 1], got {value}"
                ))
            })?;
        scores.insert(id, score);
    }
    Ok(scores)
}

fn preview(response: &str) -> &str {
    let mut end = response.len().min(PARSE_ERROR_PREVIEW_LEN);
    while !response.is_char_boundary(end) {
        end -= 1;
    }
    &response[..end]
}

/// Regex for extracting content inside markdown code fences.
static FENCE_RE: std::sync::LazyLock<regex::Regex> =
    std::sync::LazyLock::new(|| regex::Regex::new(r"(?s)```(?:json)?\s*\n(.*?)\n```").unwrap());

/// Extract candidate JSON strings from a response: the raw text, the
/// outermost `{...}` slice, then the contents of any code fences.
fn extract_json_candidates(text: &str) -> Vec<String> {
    let mut candidates = vec![text.to_string()];

    if let (Some(start), Some(end)) = (text.find('{'), text.rfind('}')) {
        if start < end {
            candidates.push(text[start..=end].to_string());
        }
    }

    for cap in FENCE_RE.captures_iter(text) {
        if let Some(inner) = cap.get(1) {
            let inner_trimmed = inner.as_str().trim();
            if !inner_trimmed.is_empty() {
                candidates.push(inner_trimmed.to_string());
            }
        }
    }

    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn openai(model: &str) -> OpenAiConfig {
        OpenAiConfig {
            endpoint: None,
            model: model.to_string(),
        }
    }

    #[test]
    fn parse_plain_object() {
        let scores = parse_relevance_response(r#"{"101": 0.8, "102": 0}"#).unwrap();
        assert_eq!(scores.len(), 2);
        assert_eq!(scores[&101], 0.8);
        assert_eq!(scores[&102], 0.0);
    }

    #[test]
    fn parse_empty_object() {
        let scores = parse_relevance_response("{}").unwrap();
        assert!(scores.is_empty());
    }

    #[test]
    fn parse_fenced_object() {
        let response = "Here you go:\n```json\n{\"7\": 0.25}\n```\n";
        let scores = parse_relevance_response(response).unwrap();
        assert_eq!(scores[&7], 0.25);
    }

    #[test]
    fn parse_object_embedded_in_prose() {
        let response = "Scores: {\"1\": 1, \"2\": 0.5} hope that helps";
        let scores = parse_relevance_response(response).unwrap();
        assert_eq!(scores[&1], 1.0);
        assert_eq!(scores[&2], 0.5);
    }

    #[test]
    fn parse_empty_response_is_error() {
        assert!(parse_relevance_response("  \n").is_err());
    }

    #[test]
    fn parse_unparseable_response() {
        let err = parse_relevance_response("I think they are all great.").unwrap_err();
        assert!(err.to_string().contains("could not parse"));
    }

    #[test]
    fn parse_array_is_rejected() {
        assert!(parse_relevance_response("[0.5, 0.2]").is_err());
    }

    #[test]
    fn non_numeric_score_is_rejected() {
        let err = parse_relevance_response(r#"{"1": "high"}"#).unwrap_err();
        assert!(matches!(err, ProviderError::ParseError(_)));
        assert!(err.to_string().contains("comment 1"));
    }

    #[test]
    fn out_of_range_score_is_rejected() {
        assert!(parse_relevance_response(r#"{"1": 1.5}"#).is_err());
        assert!(parse_relevance_response(r#"{"1": -0.1}"#).is_err());
    }

    #[test]
    fn non_integer_id_is_rejected() {
        let err = parse_relevance_response(r#"{"abc": 0.5}"#).unwrap_err();
        assert!(err.to_string().contains("abc"));
    }

    #[test]
    fn preview_respects_char_boundaries() {
        let text = "é".repeat(PARSE_ERROR_PREVIEW_LEN);
        let p = preview(&text);
        assert!(p.len() <= PARSE_ERROR_PREVIEW_LEN);
    }

    #[test]
    fn new_scorer_missing_api_key() {
        let result = RigScorer::new(&openai("gpt-4o"), &ProviderConfig::default());
        match result {
            Err(e) => assert!(e.to_string().contains("API key"), "got: {e}"),
            Ok(_) => panic!("expected error for missing API key"),
        }
    }

    #[test]
    fn new_scorer_with_api_key() {
        let provider = ProviderConfig {
            api_key: Some("sk-test".to_string()),
        };
        let scorer = RigScorer::new(&openai("gpt-4o"), &provider).unwrap();
        assert_eq!(scorer.model(), "gpt-4o");
    }

    #[test]
    fn extract_json_candidates_returns_raw_first() {
        let text = r#"{"1":0.1}"#;
        let candidates = extract_json_candidates(text);
        assert_eq!(candidates[0], text);
    }
}
