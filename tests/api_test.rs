//! Handler-level tests: the axum handlers are called directly with a
//! prepared `AppState`, no socket involved.

mod common;

use std::sync::Arc;

use async_trait::async_trait;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;

use kural_search::api::search::{get_kural, health, search};
use kural_search::config::Config;
use kural_search::engine::Engine;
use kural_search::error::{Result, SearchError};
use kural_search::llm::explain::ExplanationGenerator;
use kural_search::models::{CorpusEntry, Language, SearchRequest};
use kural_search::search::hybrid::RetrievalMode;
use kural_search::state::{AppState, EngineStatus};

use common::{sample_corpus, ConceptEmbedder, OverlapCrossEncoder};

/// Answers with one numbered piece per record.
struct NumberedExplainer;

#[async_trait]
impl ExplanationGenerator for NumberedExplainer {
    async fn explain(&self, _query: &str, records: &[CorpusEntry]) -> Result<String> {
        Ok(records
            .iter()
            .map(|r| format!("about kural {}", r.kural_id))
            .collect::<Vec<_>>()
            .join(" * "))
    }
}

struct BrokenExplainer;

#[async_trait]
impl ExplanationGenerator for BrokenExplainer {
    async fn explain(&self, _query: &str, _records: &[CorpusEntry]) -> Result<String> {
        Err(SearchError::model("chat", "500 Internal Server Error"))
    }
}

async fn ready_state(explainer: Option<Arc<dyn ExplanationGenerator>>) -> AppState {
    let entries = sample_corpus();
    let engine = Engine::builder(RetrievalMode::hybrid(0.5))
        .embedder(Arc::new(ConceptEmbedder::new()))
        .reranker(Arc::new(OverlapCrossEncoder::new()))
        .build(&entries)
        .await
        .unwrap();
    AppState::with_engine(Config::default(), engine, &entries, explainer)
}

fn request(body: serde_json::Value) -> Json<SearchRequest> {
    Json(serde_json::from_value(body).unwrap())
}

#[tokio::test]
async fn test_search_before_ready_is_unavailable() {
    let state = AppState::new(Config::default()).unwrap();
    let err = search(State(state), request(serde_json::json!({"query": "love", "lang": "en"})))
        .await
        .unwrap_err();
    assert_eq!(err.0, StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn test_unsupported_language_is_bad_request() {
    let state = ready_state(None).await;
    let err = search(State(state), request(serde_json::json!({"query": "amour", "lang": "fr"})))
        .await
        .unwrap_err();
    assert_eq!(err.0, StatusCode::BAD_REQUEST);
    assert!(err.1.contains("fr"));
}

#[tokio::test]
async fn test_language_tag_must_match_exactly() {
    let state = ready_state(None).await;
    for lang in ["EN", " ta "] {
        let err = search(
            State(state.clone()),
            request(serde_json::json!({"query": "love", "lang": lang})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.0, StatusCode::BAD_REQUEST, "lang {lang:?}");
    }
}

#[tokio::test]
async fn test_search_returns_ranked_results() {
    let state = ready_state(None).await;
    let Json(response) = search(
        State(state),
        request(serde_json::json!({"query": "wealth and governance", "lang": "en", "rerank_top_k": 3})),
    )
    .await
    .unwrap();

    assert_eq!(response.lang, Language::En);
    assert_eq!(response.results.len(), 3);
    assert_eq!(response.results[0].result.kural_id, 2);
    assert_eq!(response.results[0].result.score, 1.0);
    assert!(response.results.iter().all(|r| r.explanation.is_none()));
}

#[tokio::test]
async fn test_explanations_align_with_results() {
    let state = ready_state(Some(Arc::new(NumberedExplainer))).await;
    let Json(response) = search(
        State(state),
        request(serde_json::json!({"query": "truth", "lang": "en", "rerank_top_k": 2, "explain": true})),
    )
    .await
    .unwrap();

    assert_eq!(response.results.len(), 2);
    for item in &response.results {
        assert_eq!(
            item.explanation.as_deref(),
            Some(format!("about kural {}", item.result.kural_id).as_str())
        );
    }
}

#[tokio::test]
async fn test_explanation_failure_keeps_results() {
    let state = ready_state(Some(Arc::new(BrokenExplainer))).await;
    let Json(response) = search(
        State(state),
        request(serde_json::json!({"query": "rain", "lang": "en", "explain": true})),
    )
    .await
    .unwrap();

    assert!(!response.results.is_empty());
    assert!(response.results.iter().all(|r| r.explanation.is_none()));
}

#[tokio::test]
async fn test_blank_query_is_bad_request() {
    let state = ready_state(None).await;
    let err = search(State(state), request(serde_json::json!({"query": "  ", "lang": "ta"})))
        .await
        .unwrap_err();
    assert_eq!(err.0, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_get_kural() {
    let state = ready_state(None).await;

    let Json(entry) = get_kural(State(state.clone()), Path(3)).await.unwrap();
    assert_eq!(entry.english.get("line1"), "truth and virtue");

    let err = get_kural(State(state), Path(1330)).await.unwrap_err();
    assert_eq!(err.0, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_reports_lifecycle() {
    let state = AppState::new(Config::default()).unwrap();
    let (status, Json(body)) = health(State(state.clone())).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body.status, "building");

    *state.status.write() = EngineStatus::Failed {
        reason: "corpus missing".to_string(),
    };
    let (status, Json(body)) = health(State(state)).await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body.reason.as_deref(), Some("corpus missing"));

    let (status, Json(body)) = health(State(ready_state(None).await)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.documents, Some(4));
}

#[tokio::test]
async fn test_health_counts_indexed_documents_not_unique_ids() {
    let entries: Vec<CorpusEntry> = serde_json::from_value(serde_json::json!([
        {"kural_id": 1, "english": {"line1": "first"}},
        {"kural_id": 1, "english": {"line1": "again"}},
        {"kural_id": 2, "english": {"line1": "second"}}
    ]))
    .unwrap();
    let engine = Engine::builder(RetrievalMode::Sparse)
        .build(&entries)
        .await
        .unwrap();
    let state = AppState::with_engine(Config::default(), engine, &entries, None);

    let (status, Json(body)) = health(State(state)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.documents, Some(3));
}

#[tokio::test]
async fn test_initialize_with_missing_corpus_fails() {
    let config = Config {
        corpus_path: "/nonexistent/kurals.json".into(),
        mode: RetrievalMode::Sparse,
        ..Config::default()
    };
    let state = AppState::new(config).unwrap();

    let result = state.initialize().await;
    assert!(matches!(result, Err(SearchError::CorpusLoad { .. })));
    assert!(matches!(&*state.status.read(), EngineStatus::Failed { .. }));
}
