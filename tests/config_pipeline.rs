//! Integration tests for configuration loading and pipeline assembly.
//!
//! These exercise the library functions behind the `score` and `validate`
//! commands against the fixture thread in `tests/fixtures/thread`.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;

use kudos::config::Config;
use kudos::env::Env;
use kudos::models::{ActivitySnapshot, ScoringResult};
use kudos::orchestrator::Pipeline;
use kudos::providers::{ProviderError, RelevanceRequest, RelevanceScorer, RelevanceScores};

fn fixture_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/thread")
}

fn read_fixture<T: serde::de::DeserializeOwned>(name: &str) -> T {
    let content = std::fs::read_to_string(fixture_dir().join(name)).unwrap();
    serde_json::from_str(&content).unwrap()
}

/// Scores every requested comment at the same value.
struct FlatScorer(f64);

#[async_trait]
impl RelevanceScorer for FlatScorer {
    async fn score(
        &self,
        request: &RelevanceRequest<'_>,
        _max_tokens: u64,
    ) -> Result<RelevanceScores, ProviderError> {
        Ok(request
            .comments_to_evaluate
            .iter()
            .map(|c| (c.id, self.0))
            .collect())
    }
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

#[test]
fn fixture_config_enables_both_stages_with_key() {
    let config = Config::load(
        Some(&fixture_dir().join("kudos.toml")),
        &fixture_dir(),
        &Env::mock([("KUDOS_API_KEY", "sk-test")]),
    )
    .unwrap();

    let pipeline = Pipeline::from_config(&config);
    assert_eq!(pipeline.enabled_stages(), vec!["content_purge", "relevance"]);
}

#[test]
fn missing_api_key_disables_relevance() {
    let config = Config::load_file(&fixture_dir().join("kudos.toml")).unwrap();
    assert!(config.provider.api_key.is_none());

    let pipeline = Pipeline::from_config(&config);
    assert_eq!(pipeline.enabled_stages(), vec!["content_purge"]);
}

#[test]
fn empty_config_disables_everything() {
    let pipeline = Pipeline::from_config(&Config::default());
    assert!(pipeline.enabled_stages().is_empty());
    assert_eq!(pipeline.entries().len(), 2);
}

#[test]
fn invalid_relevance_block_disables_only_relevance() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join(".kudos.toml"),
        "[stages.content_purge]\n\n[stages.relevance.openai]\nmodel = \"\"\n",
    )
    .unwrap();

    let config = Config::load(None, dir.path(), &Env::mock([("OPENAI_API_KEY", "sk-test")])).unwrap();
    let pipeline = Pipeline::with_scorer(&config, Arc::new(FlatScorer(1.0)));
    assert_eq!(pipeline.enabled_stages(), vec!["content_purge"]);
}

#[test]
fn explicit_config_must_exist() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.toml");
    let err = Config::load(Some(&missing), dir.path(), &Env::mock(Vec::<(String, String)>::new()))
        .unwrap_err();
    assert!(err.to_string().contains("nope.toml"));
}

// ---------------------------------------------------------------------------
// score
// ---------------------------------------------------------------------------

#[tokio::test]
async fn fixture_thread_scores_end_to_end() {
    let config = Config::load_file(&fixture_dir().join("kudos.toml")).unwrap();
    let snapshot: ActivitySnapshot = read_fixture("snapshot.json");
    let result: ScoringResult = read_fixture("result.json");

    let pipeline = Pipeline::with_scorer(&config, Arc::new(FlatScorer(0.75)));
    let scored = pipeline.run(&snapshot, result).await.unwrap();

    let maintainer = &scored.get("octo-maintainer").unwrap().comments;
    assert_eq!(maintainer.len(), 1);
    assert_eq!(
        maintainer[0].content,
        "Dark mode toggle does not persist after reload."
    );
    assert_eq!(maintainer[0].relevance(), Some(1.0));

    let hubber = scored.get("hubber").unwrap();
    assert_eq!(hubber.comments.len(), 1);
    assert_eq!(hubber.comments[0].id, 9003);
    assert_eq!(
        hubber.comments[0].content,
        "The preference is only kept in memory. I will write it to localStorage."
    );
    assert_eq!(hubber.comments[0].relevance(), Some(0.75));
    assert_eq!(hubber.comments[0].reward(), Decimal::ZERO);
    assert!(hubber.extra.contains_key("task"));

    assert_eq!(scored.comment_count(), 2);
}

#[tokio::test]
async fn contributors_keep_their_input_order() {
    let config = Config::load_file(&fixture_dir().join("kudos.toml")).unwrap();
    let snapshot: ActivitySnapshot = read_fixture("snapshot.json");
    let result: ScoringResult = read_fixture("result.json");

    let pipeline = Pipeline::with_scorer(&config, Arc::new(FlatScorer(0.5)));
    let scored = pipeline.run(&snapshot, result).await.unwrap();

    let logins: Vec<&str> = scored.iter().map(|(login, _)| login.as_str()).collect();
    assert_eq!(logins, vec!["octo-maintainer", "hubber"]);
}
