//! The immutable search engine: every language's indexes plus the shared
//! models, built once and queried concurrently through `&self`.

use std::sync::Arc;

use crate::corpus::documents_for;
use crate::error::{Result, SearchError};
use crate::llm::cross_encoder::CrossEncoder;
use crate::llm::embeddings::Embedder;
use crate::models::{
    default_rerank_top_k, default_top_k, Candidate, CorpusEntry, FinalResult, Language,
    LanguageDocument,
};
use crate::search::bm25::{tokenize, SparseIndex};
use crate::search::finalize::finalize;
use crate::search::hybrid::{fuse, normalize_by_max, rank, to_candidates, RetrievalMode};
use crate::search::rerank::rerank;
use crate::search::vector::DenseIndex;

/// Documents and indexes for one language, all in the same ordinal order.
struct LanguageIndex {
    docs: Vec<LanguageDocument>,
    sparse: Option<SparseIndex>,
    dense: Option<DenseIndex>,
}

/// Per-query knobs for [`Engine::search`].
#[derive(Debug, Clone, Copy)]
pub struct SearchOptions {
    pub top_k: usize,
    pub rerank_top_k: usize,
    pub normalize: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: default_top_k(),
            rerank_top_k: default_rerank_top_k(),
            normalize: true,
        }
    }
}

pub struct EngineBuilder {
    mode: RetrievalMode,
    embedder: Option<Arc<dyn Embedder>>,
    reranker: Option<Arc<dyn CrossEncoder>>,
    batch_size: usize,
}

impl EngineBuilder {
    pub fn new(mode: RetrievalMode) -> Self {
        Self {
            mode,
            embedder: None,
            reranker: None,
            batch_size: 64,
        }
    }

    pub fn embedder(mut self, embedder: Arc<dyn Embedder>) -> Self {
        self.embedder = Some(embedder);
        self
    }

    pub fn reranker(mut self, reranker: Arc<dyn CrossEncoder>) -> Self {
        self.reranker = Some(reranker);
        self
    }

    pub fn batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Tokenize and embed the whole corpus. This is the only slow step in
    /// the engine's lifetime; nothing can query it until it returns.
    pub async fn build(self, entries: &[CorpusEntry]) -> Result<Engine> {
        if self.mode.needs_dense() && self.embedder.is_none() {
            return Err(SearchError::Config(format!(
                "{:?} retrieval needs an embedding model",
                self.mode
            )));
        }

        let mut indexes = Vec::with_capacity(Language::ALL.len());
        for lang in Language::ALL {
            let docs = documents_for(entries, lang);

            // tantivy indexing and commit block, so they run off the runtime
            let sparse = if self.mode.needs_sparse() {
                let sparse_docs = docs.clone();
                let index = tokio::task::spawn_blocking(move || SparseIndex::build(&sparse_docs))
                    .await
                    .map_err(|e| SearchError::Index(format!("sparse index build panicked: {e}")))??;
                Some(index)
            } else {
                None
            };

            let dense = match (&self.embedder, self.mode.needs_dense()) {
                (Some(embedder), true) => {
                    Some(DenseIndex::build(embedder.as_ref(), &docs, self.batch_size).await?)
                }
                _ => None,
            };

            tracing::info!(
                "Indexed {} {} documents (sparse: {}, dense: {})",
                docs.len(),
                lang,
                sparse.is_some(),
                dense.as_ref().map(|d| d.dim()).unwrap_or(0)
            );
            indexes.push(LanguageIndex { docs, sparse, dense });
        }

        let indexes: [LanguageIndex; 3] = indexes
            .try_into()
            .map_err(|_| SearchError::Index("expected one index per language".to_string()))?;

        Ok(Engine {
            mode: self.mode,
            indexes,
            embedder: self.embedder,
            reranker: self.reranker,
        })
    }
}

pub struct Engine {
    mode: RetrievalMode,
    indexes: [LanguageIndex; 3],
    embedder: Option<Arc<dyn Embedder>>,
    reranker: Option<Arc<dyn CrossEncoder>>,
}

impl Engine {
    pub fn builder(mode: RetrievalMode) -> EngineBuilder {
        EngineBuilder::new(mode)
    }

    pub fn mode(&self) -> RetrievalMode {
        self.mode
    }

    pub fn document_count(&self, lang: Language) -> usize {
        self.index(lang).docs.len()
    }

    fn index(&self, lang: Language) -> &LanguageIndex {
        &self.indexes[lang.ordinal()]
    }

    /// First-stage retrieval: at most `top_k` candidates of `lang`,
    /// descending by fused score, ties in corpus order.
    pub async fn retrieve(&self, query: &str, lang: Language, top_k: usize) -> Result<Vec<Candidate>> {
        let index = self.index(lang);

        let scores = match self.mode {
            RetrievalMode::Sparse => normalize_by_max(self.sparse_scores(index, query)?),
            RetrievalMode::Dense => normalize_by_max(self.dense_scores(index, query).await?),
            RetrievalMode::Hybrid { alpha } => {
                let sparse = normalize_by_max(self.sparse_scores(index, query)?);
                let dense = normalize_by_max(self.dense_scores(index, query).await?);
                fuse(&sparse, &dense, alpha)
            }
        };

        let order = rank(&scores, top_k);
        tracing::debug!(
            "Retrieved {} of {} {lang} documents for {:?}",
            order.len(),
            index.docs.len(),
            query
        );
        Ok(to_candidates(&index.docs, &scores, &order))
    }

    fn sparse_scores(&self, index: &LanguageIndex, query: &str) -> Result<Vec<f32>> {
        index
            .sparse
            .as_ref()
            .ok_or_else(|| SearchError::Index("sparse index not built".to_string()))?
            .score(&tokenize(query))
    }

    async fn dense_scores(&self, index: &LanguageIndex, query: &str) -> Result<Vec<f32>> {
        let (Some(dense), Some(embedder)) = (index.dense.as_ref(), self.embedder.as_ref()) else {
            return Err(SearchError::Index("dense index not built".to_string()));
        };
        dense.score(embedder.as_ref(), query).await
    }

    /// Cross-encoder rerank. Without a configured reranker the candidates
    /// keep their retrieval order and are only truncated.
    pub async fn rerank(
        &self,
        query: &str,
        candidates: Vec<Candidate>,
        top_k: usize,
    ) -> Result<Vec<Candidate>> {
        match &self.reranker {
            Some(model) => rerank(model.as_ref(), query, candidates, top_k).await,
            None => {
                let mut candidates = candidates;
                candidates.truncate(top_k);
                Ok(candidates)
            }
        }
    }

    /// Full pipeline: retrieve, rerank, finalize.
    pub async fn search(
        &self,
        query: &str,
        lang: Language,
        options: SearchOptions,
    ) -> Result<Vec<FinalResult>> {
        let query = query.trim();
        if query.is_empty() {
            return Err(SearchError::EmptyQuery);
        }

        let candidates = self.retrieve(query, lang, options.top_k).await?;
        let reranked = self.rerank(query, candidates, options.rerank_top_k).await?;
        Ok(finalize(&reranked, options.normalize))
    }
}
