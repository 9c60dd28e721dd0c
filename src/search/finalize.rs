use crate::models::{Candidate, FinalResult};

/// Project reranked candidates to public results, preserving order.
///
/// With `normalize`, scores are min-max scaled to [0, 1]; when every score
/// is equal each result gets exactly 1.0. Candidates that never went
/// through the reranker contribute their retrieval score.
pub fn finalize(reranked: &[Candidate], normalize: bool) -> Vec<FinalResult> {
    if reranked.is_empty() {
        return Vec::new();
    }

    let raw: Vec<f32> = reranked
        .iter()
        .map(|c| c.rerank_score.unwrap_or(c.score))
        .collect();

    let scores = if normalize { min_max(&raw) } else { raw };

    reranked
        .iter()
        .zip(scores)
        .map(|(c, score)| FinalResult {
            kural_id: c.kural_id,
            lang: c.lang,
            text: c.text.clone(),
            score,
        })
        .collect()
}

fn min_max(scores: &[f32]) -> Vec<f32> {
    let min = scores.iter().copied().fold(f32::INFINITY, f32::min);
    let max = scores.iter().copied().fold(f32::NEG_INFINITY, f32::max);
    if max > min {
        scores.iter().map(|s| (s - min) / (max - min)).collect()
    } else {
        vec![1.0; scores.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Language;

    fn reranked(scores: &[f32]) -> Vec<Candidate> {
        scores
            .iter()
            .enumerate()
            .map(|(i, &s)| Candidate {
                kural_id: i as i64,
                lang: Language::Hi,
                score: 0.0,
                text: format!("doc {i}"),
                rerank_score: Some(s),
            })
            .collect()
    }

    #[test]
    fn test_empty_input() {
        assert!(finalize(&[], true).is_empty());
        assert!(finalize(&[], false).is_empty());
    }

    #[test]
    fn test_min_max_scaling() {
        let out = finalize(&reranked(&[3.0, 2.0, 1.0]), true);
        let scores: Vec<f32> = out.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![1.0, 0.5, 0.0]);
    }

    #[test]
    fn test_all_equal_scores_become_one() {
        let out = finalize(&reranked(&[0.42, 0.42, 0.42]), true);
        assert!(out.iter().all(|r| r.score == 1.0));
    }

    #[test]
    fn test_single_result_becomes_one() {
        let out = finalize(&reranked(&[-3.5]), true);
        assert_eq!(out[0].score, 1.0);
    }

    #[test]
    fn test_passthrough_without_normalize() {
        let out = finalize(&reranked(&[7.5, -1.0]), false);
        assert_eq!(out[0].score, 7.5);
        assert_eq!(out[1].score, -1.0);
    }

    #[test]
    fn test_idempotent_on_normalized_input() {
        let first = finalize(&reranked(&[1.0, 0.25, 0.0]), true);
        let again: Vec<f32> = first.iter().map(|r| r.score).collect();
        let second = finalize(&reranked(&again), true);
        for (a, b) in first.iter().zip(&second) {
            assert!((a.score - b.score).abs() < 1e-6);
        }
    }

    #[test]
    fn test_order_and_fields_preserved() {
        let out = finalize(&reranked(&[0.9, 0.1]), true);
        assert_eq!(out[0].kural_id, 0);
        assert_eq!(out[1].text, "doc 1");
        assert!(out.iter().all(|r| r.lang == Language::Hi));
    }

    #[test]
    fn test_unreranked_candidates_use_retrieval_score() {
        let mut input = reranked(&[0.0, 0.0]);
        for (c, s) in input.iter_mut().zip([0.8, 0.2]) {
            c.rerank_score = None;
            c.score = s;
        }
        let out = finalize(&input, false);
        assert_eq!(out[0].score, 0.8);
        assert_eq!(out[1].score, 0.2);
    }
}
