use regex::Regex;
use std::sync::LazyLock;
use tantivy::collector::TopDocs;
use tantivy::query::{BooleanQuery, Occur, Query, TermQuery};
use tantivy::schema::*;
use tantivy::tokenizer::{TextAnalyzer, WhitespaceTokenizer};
use tantivy::{doc, Index, IndexReader, IndexWriter, ReloadPolicy, Term};

use crate::error::{Result, SearchError};
use crate::models::LanguageDocument;

/// Documents are stored pre-tokenized, so the index only needs to split
/// on the single spaces `tokenize` output is joined with.
const TOKENIZER_NAME: &str = "kural_tokens";

static WORD: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\w+").expect("valid word regex"));

/// Lowercase `text` and split it into runs of Unicode word characters.
pub fn tokenize(text: &str) -> Vec<String> {
    let lower = text.to_lowercase();
    WORD.find_iter(&lower)
        .map(|m| m.as_str().to_string())
        .collect()
}

/// BM25 index over one language's documents, built on an in-RAM tantivy
/// index. Scores come back aligned with the order documents were given
/// to [`SparseIndex::build`].
pub struct SparseIndex {
    reader: IndexReader,
    f_tokens: Field,
    f_ordinal: Field,
    num_docs: usize,
}

impl SparseIndex {
    pub fn build(docs: &[LanguageDocument]) -> Result<Self> {
        let mut schema_builder = Schema::builder();
        let indexing = TextFieldIndexing::default()
            .set_tokenizer(TOKENIZER_NAME)
            .set_index_option(IndexRecordOption::WithFreqs);
        let f_tokens = schema_builder
            .add_text_field("tokens", TextOptions::default().set_indexing_options(indexing));
        let f_ordinal = schema_builder.add_u64_field("ordinal", STORED);
        let schema = schema_builder.build();

        let index = Index::create_in_ram(schema);
        index.tokenizers().register(
            TOKENIZER_NAME,
            TextAnalyzer::builder(WhitespaceTokenizer::default()).build(),
        );

        // One thread keeps the whole corpus in a single segment.
        let mut writer: IndexWriter = index.writer_with_num_threads(1, 50_000_000)?;
        for (ordinal, d) in docs.iter().enumerate() {
            writer.add_document(doc!(
                f_tokens => tokenize(&d.text).join(" "),
                f_ordinal => ordinal as u64,
            ))?;
        }
        writer.commit()?;

        let reader = index
            .reader_builder()
            .reload_policy(ReloadPolicy::Manual)
            .try_into()?;

        Ok(Self {
            reader,
            f_tokens,
            f_ordinal,
            num_docs: docs.len(),
        })
    }

    pub fn len(&self) -> usize {
        self.num_docs
    }

    pub fn is_empty(&self) -> bool {
        self.num_docs == 0
    }

    /// BM25 score of every document against `query_tokens`.
    ///
    /// Documents sharing no token with the query score 0, and an empty
    /// token list scores 0 everywhere. Repeated tokens count repeatedly.
    pub fn score(&self, query_tokens: &[String]) -> Result<Vec<f32>> {
        let mut scores = vec![0.0f32; self.num_docs];
        if query_tokens.is_empty() || self.num_docs == 0 {
            return Ok(scores);
        }

        let clauses: Vec<(Occur, Box<dyn Query>)> = query_tokens
            .iter()
            .map(|token| {
                let term = Term::from_field_text(self.f_tokens, token);
                let query: Box<dyn Query> =
                    Box::new(TermQuery::new(term, IndexRecordOption::WithFreqs));
                (Occur::Should, query)
            })
            .collect();
        let query = BooleanQuery::new(clauses);

        let searcher = self.reader.searcher();
        let top_docs = searcher.search(&query, &TopDocs::with_limit(self.num_docs))?;

        for (score, address) in top_docs {
            let doc: TantivyDocument = searcher.doc(address)?;
            let ordinal = doc
                .get_first(self.f_ordinal)
                .and_then(|v| v.as_u64())
                .ok_or_else(|| SearchError::Index("document missing ordinal".to_string()))?
                as usize;
            if let Some(slot) = scores.get_mut(ordinal) {
                *slot = score;
            }
        }

        Ok(scores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;

    fn docs(texts: &[&str]) -> Vec<LanguageDocument> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| LanguageDocument {
                id: i as i64 + 1,
                lang: Language::En,
                text: t.to_string(),
            })
            .collect()
    }

    #[test]
    fn test_tokenize_lowercases_and_strips_punctuation() {
        assert_eq!(
            tokenize("Love, and KINDNESS!"),
            vec!["love", "and", "kindness"]
        );
    }

    #[test]
    fn test_tokenize_empty() {
        assert!(tokenize("").is_empty());
        assert!(tokenize("  ,;. ").is_empty());
    }

    #[test]
    fn test_tokenize_keeps_underscores_and_digits() {
        assert_eq!(tokenize("xyz_no_match 42"), vec!["xyz_no_match", "42"]);
    }

    #[test]
    fn test_tokenize_tamil_word_stays_whole() {
        assert_eq!(tokenize("மருந்து நோய்"), vec!["மருந்து", "நோய்"]);
    }

    #[test]
    fn test_scores_align_with_document_order() {
        let index = SparseIndex::build(&docs(&[
            "love and kindness",
            "wealth and governance",
            "truth and virtue",
        ]))
        .unwrap();
        let scores = index.score(&tokenize("kindness")).unwrap();
        assert_eq!(scores.len(), 3);
        assert!(scores[0] > 0.0);
        assert_eq!(scores[1], 0.0);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_empty_query_scores_zero() {
        let index = SparseIndex::build(&docs(&["a b", "c d"])).unwrap();
        assert_eq!(index.score(&[]).unwrap(), vec![0.0, 0.0]);
    }

    #[test]
    fn test_no_overlap_scores_zero() {
        let index = SparseIndex::build(&docs(&["love and kindness"])).unwrap();
        let scores = index.score(&tokenize("xyz_no_match_at_all")).unwrap();
        assert_eq!(scores, vec![0.0]);
    }

    #[test]
    fn test_more_matching_terms_score_higher() {
        let index = SparseIndex::build(&docs(&[
            "rain sustains the world",
            "rain and nectar sustain the world of men",
            "learning is wealth",
        ]))
        .unwrap();
        let scores = index.score(&tokenize("rain nectar")).unwrap();
        assert!(scores[1] > scores[0]);
        assert_eq!(scores[2], 0.0);
    }

    #[test]
    fn test_empty_corpus() {
        let index = SparseIndex::build(&[]).unwrap();
        assert!(index.is_empty());
        assert!(index.score(&tokenize("anything")).unwrap().is_empty());
    }

    #[test]
    fn test_query_is_case_insensitive() {
        let index = SparseIndex::build(&docs(&["Truth and Virtue", "wealth"])).unwrap();
        let scores = index.score(&tokenize("TRUTH")).unwrap();
        assert!(scores[0] > 0.0);
    }
}
