//! Title term matching.

use super::{ln_ratio, Scores};
use crate::index::{DocId, TitleIndex};
use std::collections::HashMap;

/// Idf-weighted title scores plus the number of distinct query terms each title matched.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct TitleScores {
    pub scores: Scores,
    pub matches: HashMap<DocId, u32>,
}

/// `ln(N / (df + 1))`.
pub fn idf(num_docs: u64, df: usize) -> f64 {
    ln_ratio(num_docs as f64, (df + 1) as f64)
}

/// Score titles against distinct query terms. Terms absent from the title index are ignored.
pub fn score<'a, I>(terms: I, titles: &TitleIndex, num_docs: u64) -> TitleScores
where
    I: IntoIterator<Item = &'a str>,
{
    let mut out = TitleScores::default();
    for term in terms {
        let Some(docs) = titles.docs(term) else { continue };
        let idf = idf(num_docs, docs.len());
        for &doc_id in docs {
            *out.scores.entry(doc_id).or_insert(0.0) += idf;
            *out.matches.entry(doc_id).or_insert(0) += 1;
        }
    }
    out
}

/// Rank purely by distinct matched terms, descending, ties by ascending doc id.
/// No idf weighting and no truncation.
pub fn rank_by_matches<'a, I>(terms: I, titles: &TitleIndex) -> Vec<(DocId, u32)>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut matches: HashMap<DocId, u32> = HashMap::new();
    for term in terms {
        for &doc_id in titles.docs(term).unwrap_or_default() {
            *matches.entry(doc_id).or_insert(0) += 1;
        }
    }
    let mut ranked: Vec<(DocId, u32)> = matches.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ranked
}
