use crate::error::{Result, SearchError};
use crate::llm::embeddings::Embedder;
use crate::models::LanguageDocument;

/// Unit-normalized embedding matrix for one language, one row per
/// document in the same order as the sparse index.
pub struct DenseIndex {
    rows: Vec<Vec<f32>>,
    dim: usize,
}

impl DenseIndex {
    /// Encode every document with `embedder`, `batch_size` texts per call.
    pub async fn build(
        embedder: &dyn Embedder,
        docs: &[LanguageDocument],
        batch_size: usize,
    ) -> Result<Self> {
        let texts: Vec<String> = docs.iter().map(|d| d.text.clone()).collect();
        let mut rows = Vec::with_capacity(texts.len());

        for batch in texts.chunks(batch_size.max(1)) {
            let embeddings = embedder.embed(batch).await?;
            if embeddings.len() != batch.len() {
                return Err(SearchError::model(
                    embedder.model_name(),
                    format!(
                        "returned {} embeddings for {} texts",
                        embeddings.len(),
                        batch.len()
                    ),
                ));
            }
            rows.extend(embeddings);
            tracing::debug!("Embedded {}/{} documents", rows.len(), texts.len());
        }

        Self::from_embeddings(rows).map_err(|e| SearchError::model(embedder.model_name(), e))
    }

    /// Build from raw embeddings, normalizing each row to unit length.
    pub fn from_embeddings(rows: Vec<Vec<f32>>) -> Result<Self> {
        let dim = rows.first().map(Vec::len).unwrap_or(0);
        if let Some((i, row)) = rows.iter().enumerate().find(|(_, r)| r.len() != dim) {
            return Err(SearchError::Index(format!(
                "embedding {i} has dimension {}, expected {dim}",
                row.len()
            )));
        }

        let rows = rows.into_iter().map(l2_normalize).collect();
        Ok(Self { rows, dim })
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Cosine similarity of `query` against every row.
    pub async fn score(&self, embedder: &dyn Embedder, query: &str) -> Result<Vec<f32>> {
        if self.rows.is_empty() {
            return Ok(Vec::new());
        }

        let embedding = embedder
            .embed(&[query.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| SearchError::model(embedder.model_name(), "no query embedding returned"))?;

        self.score_embedding(&embedding)
            .map_err(|e| SearchError::model(embedder.model_name(), e))
    }

    /// Dot product of the normalized query embedding with every row.
    pub fn score_embedding(&self, query_embedding: &[f32]) -> Result<Vec<f32>> {
        if self.rows.is_empty() {
            return Ok(Vec::new());
        }
        if query_embedding.len() != self.dim {
            return Err(SearchError::Index(format!(
                "query embedding has dimension {}, index has {}",
                query_embedding.len(),
                self.dim
            )));
        }

        let query = l2_normalize(query_embedding.to_vec());
        Ok(self.rows.iter().map(|row| dot(&query, row)).collect())
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

/// Scale to unit length; the zero vector stays zero.
pub fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > 0.0 {
        for x in v.iter_mut() {
            *x /= norm;
        }
    }
    v
}
