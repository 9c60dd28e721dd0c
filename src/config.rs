use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::search::hybrid::RetrievalMode;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Canonical multilingual corpus (JSON array)
    pub corpus_path: PathBuf,
    /// Server bind address
    pub bind_addr: String,
    /// Which signals feed first-stage retrieval
    pub mode: RetrievalMode,
    /// Embedding model configuration
    pub embedding: EmbeddingConfig,
    /// Cross-encoder reranker configuration
    pub reranker: RerankerConfig,
    /// Chat model used for explanations
    pub llm: LlmConfig,
    /// Generate explanations when a request asks for them
    pub explanations: bool,
}

/// Configuration for the sentence-embedding model shared by all languages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// "ollama" or "openai"
    pub provider: String,
    /// Base URL for the embedding API
    pub base_url: String,
    /// Model name for embeddings
    pub model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
    /// Texts per request while building the dense indexes
    pub batch_size: usize,
}

/// Configuration for the cross-encoder reranker sidecar.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RerankerConfig {
    /// Base URL for the reranker API (e.g. "http://127.0.0.1:8082").
    /// If None, results keep their first-stage order.
    pub base_url: Option<String>,
    /// Model name to send in the rerank request.
    pub model: Option<String>,
    /// Request timeout in seconds (capped at 30).
    pub timeout_secs: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// "ollama" or "openai"
    pub provider: String,
    /// Base URL for the LLM API
    pub base_url: String,
    /// Model name for chat
    pub chat_model: String,
    /// API key (only needed for cloud providers)
    pub api_key: Option<String>,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            corpus_path: PathBuf::from("./thirukkural_corpus.json"),
            bind_addr: "127.0.0.1:9000".to_string(),
            mode: RetrievalMode::hybrid(0.5),
            embedding: EmbeddingConfig::default(),
            reranker: RerankerConfig::default(),
            llm: LlmConfig::default(),
            explanations: false,
        }
    }
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            model: "all-minilm".to_string(),
            api_key: None,
            timeout_secs: 60,
            batch_size: 64,
        }
    }
}

impl Default for RerankerConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            model: None,
            timeout_secs: 10,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: "ollama".to_string(),
            base_url: "http://localhost:11434".to_string(),
            chat_model: "llama3.2".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary key lookup. Unparseable values keep the default.
    pub fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();

        if let Some(path) = var("KURAL_SEARCH_CORPUS") {
            config.corpus_path = PathBuf::from(path);
        }
        if let Some(addr) = var("KURAL_SEARCH_BIND_ADDR") {
            config.bind_addr = addr;
        }

        let alpha = match var("KURAL_SEARCH_ALPHA").map(|v| v.parse::<f32>()) {
            Some(Ok(a)) => a,
            Some(Err(_)) => {
                tracing::warn!("Ignoring invalid KURAL_SEARCH_ALPHA");
                0.5
            }
            None => 0.5,
        };
        config.mode = match var("KURAL_SEARCH_MODE").as_deref().map(str::trim) {
            Some("sparse") => RetrievalMode::Sparse,
            Some("dense") => RetrievalMode::Dense,
            Some("hybrid") | None => RetrievalMode::hybrid(alpha),
            Some(other) => {
                tracing::warn!("Unknown KURAL_SEARCH_MODE '{other}', using hybrid");
                RetrievalMode::hybrid(alpha)
            }
        };

        if let Some(v) = var("KURAL_SEARCH_EXPLANATIONS") {
            config.explanations = matches!(v.trim(), "1" | "true" | "yes");
        }

        // Embedding config
        if let Some(provider) = var("EMBEDDING_PROVIDER") {
            config.embedding.provider = provider;
        }
        if let Some(url) = var("EMBEDDING_BASE_URL") {
            config.embedding.base_url = url;
        }
        if let Some(model) = var("EMBEDDING_MODEL") {
            config.embedding.model = model;
        }
        if let Some(key) = var("EMBEDDING_API_KEY") {
            config.embedding.api_key = Some(key);
        }
        if let Some(Ok(v)) = var("EMBEDDING_TIMEOUT_SECS").map(|v| v.parse::<u64>()) {
            config.embedding.timeout_secs = v;
        }
        if let Some(Ok(v)) = var("EMBEDDING_BATCH_SIZE").map(|v| v.parse::<usize>()) {
            config.embedding.batch_size = v.max(1);
        }

        // Reranker config
        if let Some(url) = var("RERANKER_BASE_URL") {
            config.reranker.base_url = Some(url);
        }
        if let Some(model) = var("RERANKER_MODEL") {
            config.reranker.model = Some(model);
        }
        if let Some(Ok(v)) = var("RERANKER_TIMEOUT_SECS").map(|v| v.parse::<u64>()) {
            config.reranker.timeout_secs = v.min(30); // Cap at 30s
        }

        // Explanation LLM config
        if let Some(provider) = var("LLM_PROVIDER") {
            config.llm.provider = provider;
        }
        if let Some(url) = var("LLM_BASE_URL") {
            config.llm.base_url = url;
        }
        if let Some(model) = var("LLM_CHAT_MODEL") {
            config.llm.chat_model = model;
        }
        if let Some(key) = var("LLM_API_KEY") {
            config.llm.api_key = Some(key);
        }
        if let Some(Ok(v)) = var("LLM_TIMEOUT_SECS").map(|v| v.parse::<u64>()) {
            config.llm.timeout_secs = v;
        }

        config
    }
}
