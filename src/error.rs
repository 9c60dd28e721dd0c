use std::path::PathBuf;

/// Errors surfaced by the retrieval pipeline.
///
/// Empty candidate sets and degenerate score vectors are not errors; they
/// produce empty or explicitly normalized results instead.
#[derive(Debug, thiserror::Error)]
pub enum SearchError {
    #[error("failed to load corpus from {}: {reason}", path.display())]
    CorpusLoad { path: PathBuf, reason: String },

    #[error("unsupported language '{0}' (expected one of: en, ta, hi)")]
    UnsupportedLanguage(String),

    #[error("model '{model}' unavailable: {reason}")]
    ModelUnavailable { model: String, reason: String },

    #[error("index error: {0}")]
    Index(String),

    #[error("query is empty")]
    EmptyQuery,

    #[error("search engine is not ready")]
    NotReady,

    #[error("invalid configuration: {0}")]
    Config(String),
}

impl SearchError {
    pub fn model(model: impl Into<String>, reason: impl std::fmt::Display) -> Self {
        Self::ModelUnavailable {
            model: model.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<tantivy::TantivyError> for SearchError {
    fn from(e: tantivy::TantivyError) -> Self {
        Self::Index(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, SearchError>;
