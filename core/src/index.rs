use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub type DocId = u32;

/// One (document, term frequency) pair of a posting list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Posting {
    pub doc_id: DocId,
    pub tf: u16,
}

impl Posting {
    pub fn new(doc_id: DocId, tf: u16) -> Self { Self { doc_id, tf } }
}

/// Where a run of posting bytes starts: a blob and a byte offset inside its block.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Fragment {
    pub blob: String,
    pub offset: u64,
}

impl Fragment {
    pub fn new(blob: impl Into<String>, offset: u64) -> Self {
        Self { blob: blob.into(), offset }
    }
}

/// Body term index: document frequency and on-store location of every term's postings.
/// Built elsewhere and never mutated here.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TermIndex {
    pub df: HashMap<String, u32>,
    pub posting_locs: HashMap<String, Vec<Fragment>>,
}

impl TermIndex {
    pub fn new() -> Self { Self::default() }

    pub fn df(&self, term: &str) -> Option<u32> { self.df.get(term).copied() }

    pub fn locations(&self, term: &str) -> Option<&[Fragment]> {
        self.posting_locs.get(term).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize { self.df.len() }

    pub fn is_empty(&self) -> bool { self.df.is_empty() }
}

/// Title term index: term -> documents whose title contains it.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct TitleIndex {
    pub postings: HashMap<String, Vec<DocId>>,
}

impl TitleIndex {
    pub fn new() -> Self { Self::default() }

    pub fn docs(&self, term: &str) -> Option<&[DocId]> {
        self.postings.get(term).map(Vec::as_slice)
    }

    pub fn len(&self) -> usize { self.postings.len() }

    pub fn is_empty(&self) -> bool { self.postings.is_empty() }
}

/// Per-document metadata plus the corpus statistics derived from it at load time.
///
/// Every attribute is optional per document. Scorers skip documents whose length
/// is unknown; lookups for display fall back to an explicit default.
#[derive(Debug, Default, Clone)]
pub struct DocStore {
    lengths: HashMap<DocId, u32>,
    titles: HashMap<DocId, String>,
    pagerank: HashMap<DocId, f64>,
    pageviews: HashMap<DocId, u64>,
    num_docs: u64,
    avg_doc_len: f64,
}

impl DocStore {
    pub fn new(
        lengths: HashMap<DocId, u32>,
        titles: HashMap<DocId, String>,
        pagerank: HashMap<DocId, f64>,
        pageviews: HashMap<DocId, u64>,
    ) -> Self {
        let num_docs = lengths.len() as u64;
        let total: f64 = lengths.values().map(|&l| l as f64).sum();
        // A zero average would turn BM25 length normalization into 0/0.
        let avg_doc_len = if total > 0.0 { total / num_docs as f64 } else { 1.0 };
        Self { lengths, titles, pagerank, pageviews, num_docs, avg_doc_len }
    }

    /// Corpus size N: documents with a known length.
    pub fn num_docs(&self) -> u64 { self.num_docs }

    pub fn avg_doc_len(&self) -> f64 { self.avg_doc_len }

    pub fn doc_len(&self, doc_id: DocId) -> Option<u32> { self.lengths.get(&doc_id).copied() }

    pub fn title(&self, doc_id: DocId) -> &str {
        self.titles.get(&doc_id).map(String::as_str).unwrap_or("")
    }

    pub fn pagerank(&self, doc_id: DocId) -> Option<f64> { self.pagerank.get(&doc_id).copied() }

    pub fn pagerank_or_default(&self, doc_id: DocId) -> f64 { self.pagerank(doc_id).unwrap_or(0.0) }

    pub fn pageviews_or_default(&self, doc_id: DocId) -> u64 {
        self.pageviews.get(&doc_id).copied().unwrap_or(0)
    }

    pub fn lengths(&self) -> &HashMap<DocId, u32> { &self.lengths }

    pub fn titles(&self) -> &HashMap<DocId, String> { &self.titles }

    pub fn pageranks(&self) -> &HashMap<DocId, f64> { &self.pagerank }

    pub fn pageviews(&self) -> &HashMap<DocId, u64> { &self.pageviews }
}
