use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::sync::Arc;

use crate::config::Config;
use crate::corpus::load_corpus;
use crate::engine::Engine;
use crate::error::SearchError;
use crate::llm::cross_encoder::HttpCrossEncoder;
use crate::llm::embeddings::HttpEmbedder;
use crate::llm::explain::{ExplanationGenerator, HttpExplainer};
use crate::models::CorpusEntry;
use crate::records::CorpusRecordStore;

/// Engine lifecycle. Queries are only served once `Ready`.
#[derive(Clone)]
pub enum EngineStatus {
    Building,
    Ready(ReadyEngine),
    Failed { reason: String },
}

#[derive(Clone)]
pub struct ReadyEngine {
    pub engine: Arc<Engine>,
    pub records: Arc<CorpusRecordStore>,
    pub built_at: DateTime<Utc>,
}

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub status: Arc<RwLock<EngineStatus>>,
    pub http_client: reqwest::Client,
    pub explainer: Option<Arc<dyn ExplanationGenerator>>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let http_client = reqwest::Client::builder()
            .connect_timeout(std::time::Duration::from_secs(10))
            .timeout(std::time::Duration::from_secs(120))
            .build()?;

        let explainer: Option<Arc<dyn ExplanationGenerator>> = if config.explanations {
            Some(Arc::new(HttpExplainer::new(
                http_client.clone(),
                config.llm.clone(),
            )))
        } else {
            None
        };

        Ok(Self {
            config,
            status: Arc::new(RwLock::new(EngineStatus::Building)),
            http_client,
            explainer,
        })
    }

    /// State around an already-built engine.
    pub fn with_engine(
        config: Config,
        engine: Engine,
        entries: &[CorpusEntry],
        explainer: Option<Arc<dyn ExplanationGenerator>>,
    ) -> Self {
        let ready = ReadyEngine {
            engine: Arc::new(engine),
            records: Arc::new(CorpusRecordStore::new(entries)),
            built_at: Utc::now(),
        };
        Self {
            config,
            status: Arc::new(RwLock::new(EngineStatus::Ready(ready))),
            http_client: reqwest::Client::new(),
            explainer,
        }
    }

    /// Load the corpus and build every index. Sets `Ready` on success and
    /// `Failed` otherwise; a failure is never retried.
    pub async fn initialize(&self) -> Result<(), SearchError> {
        match self.build().await {
            Ok(ready) => {
                tracing::info!(
                    "Search engine ready ({} entries, mode {:?})",
                    ready.records.len(),
                    ready.engine.mode()
                );
                *self.status.write() = EngineStatus::Ready(ready);
                Ok(())
            }
            Err(e) => {
                *self.status.write() = EngineStatus::Failed {
                    reason: e.to_string(),
                };
                Err(e)
            }
        }
    }

    async fn build(&self) -> Result<ReadyEngine, SearchError> {
        let path = self.config.corpus_path.clone();
        let entries = tokio::task::spawn_blocking(move || load_corpus(&path))
            .await
            .map_err(|e| SearchError::Index(format!("corpus loader panicked: {e}")))??;

        let mut builder = Engine::builder(self.config.mode).batch_size(self.config.embedding.batch_size);
        if self.config.mode.needs_dense() {
            builder = builder.embedder(Arc::new(HttpEmbedder::new(
                self.http_client.clone(),
                self.config.embedding.clone(),
            )));
        }
        match HttpCrossEncoder::from_config(self.http_client.clone(), &self.config.reranker) {
            Some(reranker) => builder = builder.reranker(Arc::new(reranker)),
            None => tracing::warn!("No reranker configured; results keep retrieval order"),
        }

        let engine = builder.build(&entries).await?;
        Ok(ReadyEngine {
            engine: Arc::new(engine),
            records: Arc::new(CorpusRecordStore::new(&entries)),
            built_at: Utc::now(),
        })
    }

    /// The engine, if it has finished building.
    pub fn ready(&self) -> Result<ReadyEngine, SearchError> {
        match &*self.status.read() {
            EngineStatus::Ready(ready) => Ok(ready.clone()),
            _ => Err(SearchError::NotReady),
        }
    }
}
