//! Retrieval stages: lexical and semantic indexes, fusion, reranking and
//! result formatting.

pub mod bm25;
pub mod finalize;
pub mod hybrid;
pub mod rerank;
pub mod vector;
