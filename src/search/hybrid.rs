use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

use crate::models::{Candidate, LanguageDocument};

/// Which signals feed the ranking.
///
/// `Sparse` and `Dense` are the degenerate cases of `Hybrid` with the other
/// signal's weight fixed at 0, and they never touch the unused index.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum RetrievalMode {
    Sparse,
    Dense,
    Hybrid { alpha: f32 },
}

impl RetrievalMode {
    /// Hybrid mode with `alpha` clamped into [0, 1]. NaN falls back to 0.5.
    pub fn hybrid(alpha: f32) -> Self {
        let alpha = if alpha.is_nan() { 0.5 } else { alpha.clamp(0.0, 1.0) };
        RetrievalMode::Hybrid { alpha }
    }

    pub fn needs_dense(self) -> bool {
        !matches!(self, RetrievalMode::Sparse)
    }

    pub fn needs_sparse(self) -> bool {
        !matches!(self, RetrievalMode::Dense)
    }
}

/// Divide by the maximum, but only when the maximum is strictly positive.
/// An all-zero (or all-negative) vector is returned unscaled.
pub fn normalize_by_max(mut scores: Vec<f32>) -> Vec<f32> {
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max > 0.0 {
        for s in scores.iter_mut() {
            *s /= max;
        }
    }
    scores
}

/// `(1 - alpha) * sparse + alpha * dense`, element-wise.
pub fn fuse(sparse: &[f32], dense: &[f32], alpha: f32) -> Vec<f32> {
    debug_assert_eq!(sparse.len(), dense.len());
    sparse
        .iter()
        .zip(dense)
        .map(|(s, d)| (1.0 - alpha) * s + alpha * d)
        .collect()
}

/// Ordinals of the `top_k` highest scores, descending. Equal scores keep
/// ordinal order; NaN ranks last.
pub fn rank(scores: &[f32], top_k: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..scores.len()).collect();
    order.sort_by(|&a, &b| descending(scores[a], scores[b]));
    order.truncate(top_k);
    order
}

/// Total descending order on scores. Stable sorts using this keep ties in
/// input order.
pub(crate) fn descending(a: f32, b: f32) -> Ordering {
    sort_key(b).total_cmp(&sort_key(a))
}

fn sort_key(s: f32) -> f32 {
    if s.is_nan() {
        f32::NEG_INFINITY
    } else if s == 0.0 {
        // fold -0.0 into 0.0 so they tie
        0.0
    } else {
        s
    }
}

/// Materialize ranked ordinals into candidates.
pub fn to_candidates(docs: &[LanguageDocument], scores: &[f32], order: &[usize]) -> Vec<Candidate> {
    order
        .iter()
        .map(|&i| Candidate {
            kural_id: docs[i].id,
            lang: docs[i].lang,
            score: scores[i],
            text: docs[i].text.clone(),
            rerank_score: None,
        })
        .collect()
}
