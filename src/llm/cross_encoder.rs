//! Cross-encoder relevance model via OpenAI-compatible `/v1/rerank` endpoint.
//!
//! All (query, document) pairs go out in a single batch request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::RerankerConfig;
use crate::error::{Result, SearchError};

/// Pairwise (query, document) relevance model.
#[async_trait]
pub trait CrossEncoder: Send + Sync {
    fn model_name(&self) -> &str;

    /// Score every document against `query`. The returned scores are in
    /// the same order as `documents`.
    async fn score_pairs(&self, query: &str, documents: &[String]) -> Result<Vec<f32>>;
}

/// Cross-encoder served behind a `/v1/rerank` endpoint (llama-server,
/// text-embeddings-inference, ...).
pub struct HttpCrossEncoder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    timeout: std::time::Duration,
}

impl HttpCrossEncoder {
    /// Returns `None` when no reranker endpoint is configured.
    pub fn from_config(client: reqwest::Client, config: &RerankerConfig) -> Option<Self> {
        let base_url = config.base_url.as_deref()?;
        Some(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: config.model.clone().unwrap_or_else(|| "default".to_string()),
            timeout: std::time::Duration::from_secs(config.timeout_secs.min(30)),
        })
    }
}

#[async_trait]
impl CrossEncoder for HttpCrossEncoder {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn score_pairs(&self, query: &str, documents: &[String]) -> Result<Vec<f32>> {
        if documents.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/rerank", self.base_url);
        let req_body = RerankRequest {
            model: self.model.clone(),
            query: query.to_string(),
            documents: documents.to_vec(),
            top_n: documents.len(),
        };

        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&req_body)
            .send()
            .await
            .map_err(|e| SearchError::model(&self.model, format!("failed to reach reranker: {e}")))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(SearchError::model(
                &self.model,
                format!("reranker returned {status}: {body}"),
            ));
        }

        let body: RerankResponse = resp.json().await.map_err(|e| {
            SearchError::model(&self.model, format!("failed to parse reranker response: {e}"))
        })?;

        scores_in_document_order(body, documents.len())
            .map_err(|reason| SearchError::model(&self.model, reason))
    }
}

/// Reorder endpoint results (sorted by relevance) back into document order.
fn scores_in_document_order(
    body: RerankResponse,
    num_documents: usize,
) -> std::result::Result<Vec<f32>, String> {
    let mut scores: Vec<Option<f32>> = vec![None; num_documents];
    for r in body.results {
        let slot = scores
            .get_mut(r.index)
            .ok_or_else(|| format!("result index {} out of range", r.index))?;
        *slot = Some(sigmoid(r.relevance_score));
    }

    scores
        .into_iter()
        .enumerate()
        .map(|(i, s)| s.ok_or_else(|| format!("no score returned for document {i}")))
        .collect()
}

/// Sigmoid normalization: maps raw logits to 0-1 range.
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

// ─── Request/Response types ────────────────────────────

#[derive(Serialize)]
struct RerankRequest {
    model: String,
    query: String,
    documents: Vec<String>,
    top_n: usize,
}

#[derive(Deserialize)]
struct RerankResponse {
    results: Vec<RerankResultRaw>,
}

#[derive(Deserialize)]
struct RerankResultRaw {
    index: usize,
    relevance_score: f32,
}
