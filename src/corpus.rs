//! Corpus loading and per-language document projection.

use std::collections::HashSet;
use std::path::Path;

use crate::error::{Result, SearchError};
use crate::models::{CorpusEntry, Language, LanguageDocument};

/// Load the canonical corpus file (a JSON array of entries).
///
/// `kural_id` uniqueness is not enforced; duplicates are logged and later
/// id-keyed lookups resolve to the last occurrence.
pub fn load_corpus(path: &Path) -> Result<Vec<CorpusEntry>> {
    let data = std::fs::read_to_string(path).map_err(|e| SearchError::CorpusLoad {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    let entries = parse_corpus(&data).map_err(|reason| SearchError::CorpusLoad {
        path: path.to_path_buf(),
        reason,
    })?;

    tracing::info!("Loaded {} corpus entries from {}", entries.len(), path.display());
    Ok(entries)
}

fn parse_corpus(data: &str) -> std::result::Result<Vec<CorpusEntry>, String> {
    let entries: Vec<CorpusEntry> = serde_json::from_str(data).map_err(|e| e.to_string())?;

    let mut seen = HashSet::with_capacity(entries.len());
    for entry in &entries {
        if !seen.insert(entry.kural_id) {
            tracing::warn!("Duplicate kural_id {} in corpus; lookups use the last one", entry.kural_id);
        }
    }

    Ok(entries)
}

/// Text of one entry in `lang`, fields space-joined in a fixed order.
///
/// The Hindi projection carries the Tamil couplet lines alongside the
/// Hindi explanation.
pub fn document_text(entry: &CorpusEntry, lang: Language) -> String {
    let fields: Vec<&str> = match lang {
        Language::En => {
            let e = &entry.english;
            vec![
                e.get("line1"),
                e.get("line2"),
                e.get("translation"),
                e.get("paal"),
                e.get("iyal"),
                e.get("adhigaram"),
            ]
        }
        Language::Ta => {
            let t = &entry.tamil;
            vec![
                t.get("line1"),
                t.get("line2"),
                t.get("paal"),
                t.get("iyal"),
                t.get("adhigaram"),
            ]
        }
        Language::Hi => {
            let (t, h) = (&entry.tamil, &entry.hindi);
            vec![
                t.get("line1"),
                t.get("line2"),
                h.get("explanation"),
                h.get("paal"),
                h.get("iyal"),
                h.get("adhigaram"),
            ]
        }
    };
    fields.join(" ")
}

/// Project the corpus into `lang` documents, preserving corpus order.
pub fn documents_for(entries: &[CorpusEntry], lang: Language) -> Vec<LanguageDocument> {
    entries
        .iter()
        .map(|entry| LanguageDocument {
            id: entry.kural_id,
            lang,
            text: document_text(entry, lang),
        })
        .collect()
}
