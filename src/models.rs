use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::SearchError;

/// Languages the corpus is indexed in. A query only ever retrieves
/// documents of its own language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    En,
    Ta,
    Hi,
}

impl Language {
    pub const ALL: [Language; 3] = [Language::En, Language::Ta, Language::Hi];

    pub fn as_str(self) -> &'static str {
        match self {
            Language::En => "en",
            Language::Ta => "ta",
            Language::Hi => "hi",
        }
    }

    /// Position of this language in per-language arrays.
    pub fn ordinal(self) -> usize {
        match self {
            Language::En => 0,
            Language::Ta => 1,
            Language::Hi => 2,
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Language {
    type Err = SearchError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "en" => Ok(Language::En),
            "ta" => Ok(Language::Ta),
            "hi" => Ok(Language::Hi),
            _ => Err(SearchError::UnsupportedLanguage(s.to_string())),
        }
    }
}

/// Named text fields of one language variant (line1, line2, paal, ...).
///
/// Missing fields read as the empty string. Scalar values are stringified
/// on load and `null` becomes empty.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct LanguageFields(BTreeMap<String, String>);

impl LanguageFields {
    pub fn get(&self, field: &str) -> &str {
        self.0.get(field).map(String::as_str).unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for LanguageFields {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl<'de> Deserialize<'de> for LanguageFields {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        use serde::de::Error;
        use serde_json::Value;

        let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?.unwrap_or_default();
        let mut fields = BTreeMap::new();
        for (name, value) in raw {
            let text = match value {
                Value::String(s) => s,
                Value::Null => String::new(),
                Value::Bool(b) => b.to_string(),
                Value::Number(n) => n.to_string(),
                other => {
                    return Err(D::Error::custom(format!(
                        "field '{name}' must be a string, got {other}"
                    )))
                }
            };
            fields.insert(name, text);
        }
        Ok(Self(fields))
    }
}

/// One couplet as stored in the corpus file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CorpusEntry {
    pub kural_id: i64,
    #[serde(default)]
    pub tamil: LanguageFields,
    #[serde(default)]
    pub english: LanguageFields,
    #[serde(default)]
    pub hindi: LanguageFields,
}

/// Per-language projection of a corpus entry; the unit both indexes score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LanguageDocument {
    pub id: i64,
    pub lang: Language,
    pub text: String,
}

/// A retrieval hit. `rerank_score` is set once the reranker has judged it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Candidate {
    pub kural_id: i64,
    pub lang: Language,
    pub score: f32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rerank_score: Option<f32>,
}

/// Public output unit, ordered by descending relevance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinalResult {
    pub kural_id: i64,
    pub lang: Language,
    pub text: String,
    pub score: f32,
}

/// Search request
#[derive(Debug, Clone, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    pub lang: String,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
    #[serde(default = "default_rerank_top_k")]
    pub rerank_top_k: usize,
    #[serde(default = "default_true")]
    pub normalize: bool,
    #[serde(default)]
    pub explain: bool,
}

pub fn default_top_k() -> usize {
    12
}

pub fn default_rerank_top_k() -> usize {
    5
}

fn default_true() -> bool {
    true
}

/// A final result plus its generated explanation, if one was requested.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResultItem {
    #[serde(flatten)]
    pub result: FinalResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explanation: Option<String>,
}

/// Search response
#[derive(Debug, Clone, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub lang: Language,
    pub results: Vec<SearchResultItem>,
}
