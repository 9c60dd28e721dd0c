//! Deterministic in-process stand-ins for the external models.

#![allow(dead_code)]

use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use kural_search::error::{Result, SearchError};
use kural_search::llm::cross_encoder::CrossEncoder;
use kural_search::llm::embeddings::Embedder;
use kural_search::models::CorpusEntry;
use kural_search::search::bm25::tokenize;

/// Concept groups: a token adds 1.0 to its group's dimension.
const CONCEPTS: &[&[&str]] = &[
    &["love", "kindness", "compassion", "அன்பு", "प्रेम", "दया"],
    &["wealth", "governance", "riches", "பொருள்", "धन", "शासन"],
    &["truth", "virtue", "honesty", "அறம்", "सत्य", "धर्म"],
    &["rain", "world", "மழை", "वर्षा"],
];

/// Embeds text as concept counts. Text with no known word embeds to the
/// zero vector.
pub struct ConceptEmbedder {
    pub calls: AtomicUsize,
    pub fail: AtomicBool,
}

impl ConceptEmbedder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail: AtomicBool::new(false),
        }
    }
}

#[async_trait]
impl Embedder for ConceptEmbedder {
    fn model_name(&self) -> &str {
        "concept"
    }

    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(SearchError::model("concept", "connection refused"));
        }
        Ok(texts.iter().map(|t| concept_vector(t)).collect())
    }
}

pub fn concept_vector(text: &str) -> Vec<f32> {
    let mut v = vec![0.0f32; CONCEPTS.len()];
    for token in tokenize(text) {
        for (dim, words) in CONCEPTS.iter().enumerate() {
            if words.contains(&token.as_str()) {
                v[dim] += 1.0;
            }
        }
    }
    v
}

/// Scores a pair by how many query tokens the document contains.
pub struct OverlapCrossEncoder {
    pub calls: AtomicUsize,
}

impl OverlapCrossEncoder {
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
        }
    }
}

#[async_trait]
impl CrossEncoder for OverlapCrossEncoder {
    fn model_name(&self) -> &str {
        "overlap"
    }

    async fn score_pairs(&self, query: &str, documents: &[String]) -> Result<Vec<f32>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let query_tokens = tokenize(query);
        Ok(documents
            .iter()
            .map(|d| {
                let doc_tokens = tokenize(d);
                query_tokens.iter().filter(|q| doc_tokens.contains(q)).count() as f32
            })
            .collect())
    }
}

/// A reranker whose endpoint is down.
pub struct DownCrossEncoder;

#[async_trait]
impl CrossEncoder for DownCrossEncoder {
    fn model_name(&self) -> &str {
        "down"
    }

    async fn score_pairs(&self, _query: &str, _documents: &[String]) -> Result<Vec<f32>> {
        Err(SearchError::model("down", "timed out"))
    }
}

pub fn sample_corpus() -> Vec<CorpusEntry> {
    serde_json::from_value(serde_json::json!([
        {
            "kural_id": 1,
            "tamil": {"line1": "அன்பு உடைமை", "line2": "அன்பின் வழியது", "paal": "அறத்துப்பால்"},
            "english": {"line1": "love and kindness", "translation": "the loving heart"},
            "hindi": {"explanation": "प्रेम और दया"}
        },
        {
            "kural_id": 2,
            "tamil": {"line1": "பொருள் செயல்வகை"},
            "english": {"line1": "wealth and governance", "translation": "riches of the realm"},
            "hindi": {"explanation": "धन और शासन"}
        },
        {
            "kural_id": 3,
            "tamil": {"line1": "அறம் வலியுறுத்தல்"},
            "english": {"line1": "truth and virtue", "translation": "the way of honesty"},
            "hindi": {"explanation": "सत्य और धर्म"}
        },
        {
            "kural_id": 4,
            "tamil": {"line1": "வான் சிறப்பு மழை"},
            "english": {"line1": "the rain sustains the world", "translation": "rain is nectar"},
            "hindi": {"explanation": "वर्षा का महत्व"}
        }
    ]))
    .expect("valid sample corpus")
}

pub fn three_document_corpus() -> Vec<CorpusEntry> {
    serde_json::from_value(serde_json::json!([
        {"kural_id": 0, "english": {"line1": "love and kindness"}},
        {"kural_id": 1, "english": {"line1": "wealth and governance"}},
        {"kural_id": 2, "english": {"line1": "truth and virtue"}}
    ]))
    .expect("valid corpus")
}
