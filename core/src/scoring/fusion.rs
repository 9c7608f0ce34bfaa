//! Blends title, BM25 and PageRank signals into one ranking score.
//!
//! Title and BM25 scores are each normalized by their per-query maximum. The title
//! share is weighted by how much of the query the title covers, BM25 gets a flat
//! weight, and PageRank adds a small capped boost.

use super::title::TitleScores;
use super::{rank, Scores};
use crate::index::{DocId, DocStore};
use std::collections::HashSet;

/// Results kept by the fused and body rankings.
pub const TOP_K: usize = 100;

pub const BM25_WEIGHT: f64 = 100.0;
pub const PAGERANK_FACTOR: f64 = 5.0;
pub const PAGERANK_CAP: f64 = 10.0;

/// Weight applied to the normalized title score, by fraction of distinct query terms matched.
pub fn title_weight(match_ratio: f64) -> f64 {
    if match_ratio >= 0.8 {
        200.0
    } else if match_ratio >= 0.5 {
        100.0
    } else if match_ratio >= 0.3 {
        50.0
    } else {
        25.0
    }
}

pub fn authority_boost(pagerank: f64) -> f64 {
    (pagerank * PAGERANK_FACTOR).min(PAGERANK_CAP)
}

/// Largest observed score, or 1 when there is none or it cannot be divided by.
fn normalizer(scores: &Scores) -> f64 {
    let max = scores.values().copied().fold(f64::NEG_INFINITY, f64::max);
    if max.is_finite() && max != 0.0 { max } else { 1.0 }
}

/// Fused score of every candidate, unsorted.
pub fn fused_scores(title: &TitleScores, bm25: &Scores, num_query_terms: usize, docs: &DocStore) -> Scores {
    let candidates: HashSet<DocId> = title.scores.keys().chain(bm25.keys()).copied().collect();
    let max_title = normalizer(&title.scores);
    let max_bm25 = normalizer(bm25);
    let num_terms = num_query_terms.max(1) as f64;

    candidates
        .into_iter()
        .map(|doc_id| {
            let mut score = 0.0;
            if let Some(&t) = title.scores.get(&doc_id) {
                let matched = title.matches.get(&doc_id).copied().unwrap_or(0);
                score += (t / max_title) * title_weight(matched as f64 / num_terms);
            }
            if let Some(&b) = bm25.get(&doc_id) {
                score += (b / max_bm25) * BM25_WEIGHT;
            }
            if let Some(pr) = docs.pagerank(doc_id) {
                score += authority_boost(pr);
            }
            (doc_id, score)
        })
        .collect()
}

/// Fuse, sort (ties by ascending doc id) and keep the best `top_k`.
pub fn fuse(
    title: &TitleScores,
    bm25: &Scores,
    num_query_terms: usize,
    docs: &DocStore,
    top_k: usize,
) -> Vec<(DocId, f64)> {
    rank(fused_scores(title, bm25, num_query_terms, docs), Some(top_k))
}
