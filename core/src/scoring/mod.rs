//! Per-signal scorers and the fusion step that blends them.
//!
//! Every scorer works on request-local accumulators and borrows the loaded index
//! data read-only, so concurrent queries never share mutable state.

pub mod bm25;
pub mod fusion;
pub mod tfidf;
pub mod title;

use crate::index::{DocId, Posting};
use std::collections::HashMap;

/// Per-document accumulated score for one query.
pub type Scores = HashMap<DocId, f64>;

/// A query term with its fetched posting list.
#[derive(Debug, Clone, PartialEq)]
pub struct TermPostings {
    pub term: String,
    /// Occurrences of the term in the query.
    pub query_tf: u32,
    /// Document frequency from the term index.
    pub df: u32,
    pub postings: Vec<Posting>,
}

/// Distinct terms of a token stream with their counts, in first-occurrence order.
pub fn query_terms(tokens: &[String]) -> Vec<(String, u32)> {
    let mut counts: Vec<(String, u32)> = Vec::new();
    let mut slot: HashMap<&str, usize> = HashMap::new();
    for tok in tokens {
        match slot.get(tok.as_str()) {
            Some(&i) => counts[i].1 += 1,
            None => {
                slot.insert(tok.as_str(), counts.len());
                counts.push((tok.clone(), 1));
            }
        }
    }
    counts
}

/// `ln(num / den)`, or 0 when either side is zero.
pub(crate) fn ln_ratio(num: f64, den: f64) -> f64 {
    if num == 0.0 || den == 0.0 { 0.0 } else { (num / den).ln() }
}

/// Sort by score descending, ties by ascending doc id, optionally keeping the first `k`.
pub fn rank<I>(scores: I, k: Option<usize>) -> Vec<(DocId, f64)>
where
    I: IntoIterator<Item = (DocId, f64)>,
{
    let mut ranked: Vec<(DocId, f64)> = scores.into_iter().collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    if let Some(k) = k {
        ranked.truncate(k);
    }
    ranked
}
