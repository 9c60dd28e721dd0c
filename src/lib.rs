//! # kural-search
//!
//! Multilingual retrieval over the Thirukkural. A query in English, Tamil or
//! Hindi is matched against couplets of the same language with a hybrid of
//! BM25 and embedding similarity, then refined by a cross-encoder.
//!
//! ## Architecture
//!
//! ```text
//!              ┌──────────────────────┐
//!              │  Corpus (JSON file)  │
//!              └──────────┬───────────┘
//!                         │ load once, project per language
//!            ┌────────────┴────────────┐
//!            ▼                         ▼
//!   ┌────────────────┐       ┌──────────────────┐
//!   │  BM25 (per     │       │ Embedding matrix │
//!   │  language)     │       │ (per language)   │
//!   └───────┬────────┘       └────────┬─────────┘
//!           │ ÷ max if max > 0        │ ÷ max if max > 0
//!           └────────────┬────────────┘
//!                        ▼
//!          ┌───────────────────────────┐
//!          │ (1-α)·sparse + α·dense    │
//!          │ stable sort, keep top_k   │
//!          └─────────────┬─────────────┘
//!                        ▼
//!          ┌───────────────────────────┐
//!          │ Cross-encoder rerank      │
//!          │ one batched call          │
//!          └─────────────┬─────────────┘
//!                        ▼
//!          ┌───────────────────────────┐
//!          │ Min-max to [0,1]          │
//!          │ (all equal → 1.0)         │
//!          └───────────────────────────┘
//! ```
//!
//! ## Module Overview
//!
//! - [`config`] - Environment-based configuration for the corpus, models and server
//! - [`models`] - `Language`, corpus records, `Candidate`, `FinalResult`, request/response types
//! - [`corpus`] - Corpus loading and per-language document projection
//! - [`search::bm25`] - Tokenizer and per-language BM25 index powered by tantivy
//! - [`search::vector`] - Unit-normalized embedding matrix with cosine scoring
//! - [`search::hybrid`] - Max-normalization, weighted fusion and stable ranking
//! - [`search::rerank`] - Cross-encoder reranking of a candidate shortlist
//! - [`search::finalize`] - Min-max score normalization and result projection
//! - [`engine`] - The immutable engine tying the indexes and models together
//! - [`llm`] - Embedding, cross-encoder and explanation clients
//! - [`records`] - Record lookup by id for result hydration
//! - [`api`] - Axum HTTP handlers
//! - [`state`] - Shared application state and engine readiness

pub mod api;
pub mod config;
pub mod corpus;
pub mod engine;
pub mod error;
pub mod llm;
pub mod models;
pub mod records;
pub mod search;
pub mod state;
