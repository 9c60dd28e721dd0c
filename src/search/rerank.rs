//! Second-stage re-judgment of a candidate shortlist.

use crate::error::{Result, SearchError};
use crate::llm::cross_encoder::CrossEncoder;
use crate::models::Candidate;
use crate::search::hybrid::descending;

/// Re-score `candidates` with a single batched cross-encoder call and keep
/// the `top_k` best by `rerank_score`.
///
/// The retrieval `score` is ignored for ordering. Ties keep input order.
/// An empty list returns immediately without calling the model.
pub async fn rerank(
    model: &dyn CrossEncoder,
    query: &str,
    mut candidates: Vec<Candidate>,
    top_k: usize,
) -> Result<Vec<Candidate>> {
    if candidates.is_empty() {
        return Ok(candidates);
    }

    let texts: Vec<String> = candidates.iter().map(|c| c.text.clone()).collect();
    let scores = model.score_pairs(query, &texts).await?;
    if scores.len() != candidates.len() {
        return Err(SearchError::model(
            model.model_name(),
            format!(
                "returned {} scores for {} pairs",
                scores.len(),
                candidates.len()
            ),
        ));
    }

    for (candidate, score) in candidates.iter_mut().zip(scores) {
        candidate.rerank_score = Some(score);
    }

    candidates.sort_by(|a, b| {
        descending(
            a.rerank_score.unwrap_or(f32::NAN),
            b.rerank_score.unwrap_or(f32::NAN),
        )
    });
    candidates.truncate(top_k);

    tracing::debug!("Reranked to {} candidates", candidates.len());
    Ok(candidates)
}
