use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::engine::SearchOptions;
use crate::error::SearchError;
use crate::llm::explain::{align_explanations, split_explanations, EXPLANATION_DELIMITER};
use crate::models::{
    CorpusEntry, FinalResult, Language, SearchRequest, SearchResponse, SearchResultItem,
};
use crate::records::RecordStore;
use crate::state::{AppState, EngineStatus};

type ApiError = (StatusCode, String);

fn api_error(e: SearchError) -> ApiError {
    let status = match &e {
        SearchError::UnsupportedLanguage(_) | SearchError::EmptyQuery => StatusCode::BAD_REQUEST,
        SearchError::NotReady => StatusCode::SERVICE_UNAVAILABLE,
        SearchError::ModelUnavailable { .. } => StatusCode::BAD_GATEWAY,
        SearchError::CorpusLoad { .. } | SearchError::Index(_) | SearchError::Config(_) => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    (status, e.to_string())
}

/// POST /api/search - retrieve → rerank → finalize, with optional
/// per-result explanations.
pub async fn search(
    State(state): State<AppState>,
    Json(req): Json<SearchRequest>,
) -> Result<Json<SearchResponse>, ApiError> {
    let query = req.query.trim().to_string();
    let lang: Language = req.lang.parse().map_err(api_error)?;
    let ready = state.ready().map_err(api_error)?;

    let options = SearchOptions {
        top_k: req.top_k,
        rerank_top_k: req.rerank_top_k,
        normalize: req.normalize,
    };
    let results = ready
        .engine
        .search(&query, lang, options)
        .await
        .map_err(|e| {
            tracing::warn!("Search failed for {lang} query {query:?}: {e}");
            api_error(e)
        })?;

    let explanations = if req.explain {
        explain_results(&state, ready.records.as_ref(), &query, &results).await
    } else {
        vec![None; results.len()]
    };

    let results = results
        .into_iter()
        .zip(explanations)
        .map(|(result, explanation)| SearchResultItem { result, explanation })
        .collect();

    Ok(Json(SearchResponse {
        query,
        lang,
        results,
    }))
}

/// One explanation slot per result. Explanation failures degrade to
/// `None`; the ranked results are still returned.
async fn explain_results(
    state: &AppState,
    records: &dyn RecordStore,
    query: &str,
    results: &[FinalResult],
) -> Vec<Option<String>> {
    let mut slots = vec![None; results.len()];
    let Some(explainer) = state.explainer.as_ref() else {
        return slots;
    };

    let (positions, found): (Vec<usize>, Vec<CorpusEntry>) = results
        .iter()
        .enumerate()
        .filter_map(|(i, r)| records.get(r.kural_id).map(|rec| (i, rec)))
        .unzip();
    if found.is_empty() {
        return slots;
    }

    match explainer.explain(query, &found).await {
        Ok(answer) => {
            let pieces = split_explanations(&answer, EXPLANATION_DELIMITER);
            for (pos, text) in positions.into_iter().zip(align_explanations(pieces, found.len())) {
                slots[pos] = Some(text);
            }
        }
        Err(e) => tracing::warn!("Explanation generation failed: {e}"),
    }
    slots
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub built_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub documents: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// GET /api/health - readiness of the search engine
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let status = state.status.read().clone();
    match status {
        EngineStatus::Building => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "building",
                built_at: None,
                documents: None,
                reason: None,
            }),
        ),
        EngineStatus::Ready(ready) => (
            StatusCode::OK,
            Json(HealthResponse {
                status: "ready",
                built_at: Some(ready.built_at),
                // every language indexes one document per corpus entry
                documents: Some(ready.engine.document_count(Language::En)),
                reason: None,
            }),
        ),
        EngineStatus::Failed { reason } => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthResponse {
                status: "failed",
                built_at: None,
                documents: None,
                reason: Some(reason),
            }),
        ),
    }
}

/// GET /api/kurals/{id} - full record for display
pub async fn get_kural(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<CorpusEntry>, ApiError> {
    let ready = state.ready().map_err(api_error)?;
    ready
        .records
        .get(id)
        .map(Json)
        .ok_or_else(|| (StatusCode::NOT_FOUND, format!("Kural {id} not found")))
}
