//! TF-IDF dot product over body postings.
//!
//! Neither the query vector nor the document vectors are L2-normalized, so
//! magnitudes only compare within a single query's results.

use super::{ln_ratio, Scores, TermPostings};
use crate::index::DocStore;

/// `ln(N / df)`, 0 when df is 0.
pub fn idf(num_docs: u64, df: u32) -> f64 {
    ln_ratio(num_docs as f64, df as f64)
}

pub fn score(lists: &[TermPostings], docs: &DocStore) -> Scores {
    let mut scores = Scores::new();
    for list in lists {
        let idf = idf(docs.num_docs(), list.df);
        let query_weight = list.query_tf as f64 * idf;
        for p in &list.postings {
            let len = match docs.doc_len(p.doc_id) {
                Some(len) if len > 0 => len,
                _ => continue,
            };
            let doc_weight = (p.tf as f64 / len as f64) * idf;
            *scores.entry(p.doc_id).or_insert(0.0) += query_weight * doc_weight;
        }
    }
    scores
}
