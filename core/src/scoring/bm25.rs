//! Okapi BM25 over body postings.

use super::{Scores, TermPostings};
use crate::index::DocStore;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bm25Params {
    pub k1: f64,
    pub b: f64,
}

impl Default for Bm25Params {
    fn default() -> Self { Self { k1: 1.5, b: 0.75 } }
}

/// `ln((N - df + 0.5) / (df + 0.5) + 1)`. Not clamped; goes negative only if df exceeds N.
pub fn idf(num_docs: u64, df: u32) -> f64 {
    let (n, df) = (num_docs as f64, df as f64);
    ((n - df + 0.5) / (df + 0.5) + 1.0).ln()
}

/// Length-normalized term frequency component, without the idf factor.
pub fn tf_component(tf: u16, doc_len: u32, avg_doc_len: f64, params: Bm25Params) -> f64 {
    let tf = tf as f64;
    let norm = 1.0 - params.b + params.b * (doc_len as f64 / avg_doc_len);
    tf * (params.k1 + 1.0) / (tf + params.k1 * norm)
}

pub fn score(lists: &[TermPostings], docs: &DocStore, params: Bm25Params) -> Scores {
    let mut scores = Scores::new();
    let avg = docs.avg_doc_len();
    for list in lists {
        let idf = idf(docs.num_docs(), list.df);
        for p in &list.postings {
            let Some(len) = docs.doc_len(p.doc_id) else { continue };
            *scores.entry(p.doc_id).or_insert(0.0) += idf * tf_component(p.tf, len, avg, params);
        }
    }
    scores
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Posting;
    use proptest::prelude::*;
    use std::collections::HashMap;

    fn docs(lengths: &[(u32, u32)]) -> DocStore {
        DocStore::new(lengths.iter().copied().collect(), HashMap::new(), HashMap::new(), HashMap::new())
    }

    fn list(df: u32, postings: Vec<Posting>) -> TermPostings {
        TermPostings { term: "x".into(), query_tf: 1, df, postings }
    }

    #[test]
    fn matches_closed_form() {
        // N = 4, avg = 50
        let d = docs(&[(10, 40), (20, 60), (30, 50), (40, 50)]);
        let s = score(&[list(2, vec![Posting::new(10, 3)])], &d, Bm25Params::default());
        let idf = (2.5f64 / 2.5 + 1.0).ln();
        let expected = idf * (3.0 * 2.5) / (3.0 + 1.5 * (0.25 + 0.75 * 0.8));
        assert!((s[&10] - expected).abs() < 1e-12);
    }

    #[test]
    fn unknown_length_scores_nothing() {
        let d = docs(&[(10, 40)]);
        let s = score(&[list(1, vec![Posting::new(10, 1), Posting::new(99, 5)])], &d, Bm25Params::default());
        assert!(s.contains_key(&10));
        assert!(!s.contains_key(&99));
    }

    proptest! {
        #[test]
        fn strictly_increases_with_tf(
            tf1 in 0u16..u16::MAX,
            gap in 1u16..=u16::MAX,
            num_docs in 2u32..500,
            df_seed in any::<u32>(),
            len in 1u32..1_000,
        ) {
            let tf2 = tf1.saturating_add(gap);
            let df = 1 + df_seed % (num_docs - 1);
            let mut lengths: HashMap<u32, u32> = (1..num_docs).map(|d| (d, 100)).collect();
            lengths.insert(0, len);
            let d = DocStore::new(lengths, HashMap::new(), HashMap::new(), HashMap::new());

            let at = |tf| score(&[list(df, vec![Posting::new(0, tf)])], &d, Bm25Params::default())[&0];
            prop_assert!(at(tf1) < at(tf2), "tf1={} tf2={} df={} N={}", tf1, tf2, df, num_docs);
        }
    }

    #[test]
    fn zero_length_corpus_scores_are_finite() {
        let d = docs(&[(1, 0), (2, 0)]);
        let s = score(&[list(1, vec![Posting::new(1, 3), Posting::new(2, 1)])], &d, Bm25Params::default());
        assert!(s.values().all(|v| v.is_finite()));
        assert!(s[&1] > s[&2]);
    }

    #[test]
    fn idf_falls_with_df() {
        assert!(idf(100, 1) > idf(100, 50));
        assert!(idf(100, 100) > 0.0);
        assert!(idf(100, 200) < 0.0);
    }

    #[test]
    fn sums_across_terms() {
        let d = docs(&[(1, 10), (2, 10)]);
        let a = list(1, vec![Posting::new(1, 1)]);
        let b = list(1, vec![Posting::new(1, 1)]);
        let one = score(&[a.clone()], &d, Bm25Params::default())[&1];
        let two = score(&[a, b], &d, Bm25Params::default())[&1];
        assert!((two - 2.0 * one).abs() < 1e-12);
    }
}
