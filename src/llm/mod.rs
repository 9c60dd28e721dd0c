//! Clients for the external models: sentence embeddings, the cross-encoder
//! reranker and the explanation generator.

pub mod cross_encoder;
pub mod embeddings;
pub mod explain;
