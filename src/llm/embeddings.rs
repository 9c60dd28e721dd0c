use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::EmbeddingConfig;
use crate::error::{Result, SearchError};

/// Maximum characters sent per text. Couplet documents are far shorter;
/// the cap only guards against a malformed corpus row.
const MAX_EMBED_CHARS: usize = 3_000;

/// Truncate `text` to at most `MAX_EMBED_CHARS`, splitting on a UTF-8 char boundary.
fn truncate_for_embedding(text: &str) -> &str {
    if text.len() <= MAX_EMBED_CHARS {
        return text;
    }
    let mut end = MAX_EMBED_CHARS;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    &text[..end]
}

/// A sentence-embedding model shared by every language's dense index.
#[async_trait]
pub trait Embedder: Send + Sync {
    fn model_name(&self) -> &str;

    /// One embedding per input text, in input order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Embedding client for Ollama or OpenAI-compatible APIs.
pub struct HttpEmbedder {
    client: reqwest::Client,
    config: EmbeddingConfig,
}

impl HttpEmbedder {
    pub fn new(client: reqwest::Client, config: EmbeddingConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn model_name(&self) -> &str {
        &self.config.model
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let truncated: Vec<String> = texts
            .iter()
            .map(|t| truncate_for_embedding(t).to_string())
            .collect();

        let result = match self.config.provider.as_str() {
            "ollama" => self.embed_ollama(truncated).await,
            "openai" => self.embed_openai(truncated).await,
            other => Err(format!("unknown embedding provider: {other}")),
        };

        result.map_err(|reason| SearchError::model(&self.config.model, reason))
    }
}

// ─── Ollama ──────────────────────────────────────────────

#[derive(Serialize)]
struct OllamaEmbedRequest {
    model: String,
    input: Vec<String>,
    truncate: bool,
}

#[derive(Deserialize)]
struct OllamaEmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

// ─── OpenAI-compatible ───────────────────────────────────

#[derive(Serialize)]
struct OpenAiEmbedRequest {
    model: String,
    input: Vec<String>,
}

#[derive(Deserialize)]
struct OpenAiEmbedResponse {
    data: Vec<OpenAiEmbedData>,
}

#[derive(Deserialize)]
struct OpenAiEmbedData {
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    async fn embed_ollama(&self, input: Vec<String>) -> std::result::Result<Vec<Vec<f32>>, String> {
        let url = format!("{}/api/embed", self.config.base_url.trim_end_matches('/'));
        let req = OllamaEmbedRequest {
            model: self.config.model.clone(),
            input,
            truncate: true,
        };

        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout())
            .json(&req)
            .send()
            .await
            .map_err(|e| format!("failed to call Ollama embed API: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("Ollama embed API returned {status}: {body}"));
        }

        let body: OllamaEmbedResponse = resp
            .json()
            .await
            .map_err(|e| format!("failed to parse Ollama embed response: {e}"))?;
        Ok(body.embeddings)
    }

    async fn embed_openai(&self, input: Vec<String>) -> std::result::Result<Vec<Vec<f32>>, String> {
        let url = format!("{}/v1/embeddings", self.config.base_url.trim_end_matches('/'));
        let api_key = self.config.api_key.as_deref().unwrap_or_default();
        let req = OpenAiEmbedRequest {
            model: self.config.model.clone(),
            input,
        };

        let resp = self
            .client
            .post(&url)
            .timeout(self.timeout())
            .header("Authorization", format!("Bearer {api_key}"))
            .json(&req)
            .send()
            .await
            .map_err(|e| format!("failed to call OpenAI embed API: {e}"))?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            return Err(format!("OpenAI embed API returned {status}: {body}"));
        }

        let body: OpenAiEmbedResponse = resp
            .json()
            .await
            .map_err(|e| format!("failed to parse OpenAI embed response: {e}"))?;
        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}
