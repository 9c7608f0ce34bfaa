//! Query orchestration: tokenize, fetch postings, score, rank, attach titles.

use crate::blob::{BlobError, BlobStore};
use crate::index::{DocId, DocStore, TermIndex, TitleIndex};
use crate::persist::Snapshot;
use crate::reader::{read_posting_list, ReadError, BLOCK_CAPACITY};
use crate::scoring::bm25::{self, Bm25Params};
use crate::scoring::{fusion, query_terms, rank, tfidf, title, TermPostings};
use crate::tokenizer::tokenize;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    pub bm25: Bm25Params,
    pub block_capacity: usize,
    pub top_k: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self { bm25: Bm25Params::default(), block_capacity: BLOCK_CAPACITY, top_k: fusion::TOP_K }
    }
}

#[derive(Debug, Error)]
pub enum SearchError {
    /// Posting data could not be fetched; the ranking would be silently incomplete.
    #[error("posting store unavailable: {0}")]
    Unavailable(#[from] BlobError),
}

/// One ranked result, serialized as `[doc_id, title]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hit(pub DocId, pub String);

/// Read-only search service over a loaded snapshot. Share it behind an `Arc`.
pub struct SearchEngine {
    body: TermIndex,
    titles: TitleIndex,
    docs: DocStore,
    store: Arc<dyn BlobStore>,
    config: EngineConfig,
}

impl SearchEngine {
    pub fn new(snapshot: Snapshot, store: Arc<dyn BlobStore>, config: EngineConfig) -> Self {
        let Snapshot { body, titles, docs } = snapshot;
        Self { body, titles, docs, store, config }
    }

    pub fn docs(&self) -> &DocStore { &self.docs }

    pub fn config(&self) -> &EngineConfig { &self.config }

    /// Title matches fused with body BM25 and a PageRank boost.
    pub async fn search(&self, query: &str) -> Result<Vec<Hit>, SearchError> {
        let start = Instant::now();
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return Ok(vec![]);
        }
        let terms = query_terms(&tokens);
        let titles = title::score(terms.iter().map(|(t, _)| t.as_str()), &self.titles, self.docs.num_docs());
        let lists = self.fetch_postings(&terms).await?;
        let bm25 = bm25::score(&lists, &self.docs, self.config.bm25);
        let ranked = fusion::fuse(&titles, &bm25, terms.len(), &self.docs, self.config.top_k);
        tracing::debug!(tokens = tokens.len(), hits = ranked.len(), elapsed_ms = start.elapsed().as_millis() as u64, "search");
        Ok(self.hits(ranked.into_iter().map(|(d, _)| d)))
    }

    /// Body-only TF-IDF ranking.
    pub async fn search_body(&self, query: &str) -> Result<Vec<Hit>, SearchError> {
        let start = Instant::now();
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return Ok(vec![]);
        }
        let lists = self.fetch_postings(&query_terms(&tokens)).await?;
        let ranked = rank(tfidf::score(&lists, &self.docs), Some(self.config.top_k));
        tracing::debug!(tokens = tokens.len(), hits = ranked.len(), elapsed_ms = start.elapsed().as_millis() as u64, "search_body");
        Ok(self.hits(ranked.into_iter().map(|(d, _)| d)))
    }

    /// Every document whose title matches a query term, by distinct matches.
    pub fn search_title(&self, query: &str) -> Vec<Hit> {
        let tokens = tokenize(query);
        if tokens.is_empty() {
            return vec![];
        }
        let terms = query_terms(&tokens);
        let ranked = title::rank_by_matches(terms.iter().map(|(t, _)| t.as_str()), &self.titles);
        tracing::debug!(tokens = tokens.len(), hits = ranked.len(), "search_title");
        self.hits(ranked.into_iter().map(|(d, _)| d))
    }

    pub fn pagerank(&self, ids: &[DocId]) -> Vec<f64> {
        ids.iter().map(|&d| self.docs.pagerank_or_default(d)).collect()
    }

    pub fn pageviews(&self, ids: &[DocId]) -> Vec<u64> {
        ids.iter().map(|&d| self.docs.pageviews_or_default(d)).collect()
    }

    fn hits(&self, ids: impl Iterator<Item = DocId>) -> Vec<Hit> {
        ids.map(|d| Hit(d, self.docs.title(d).to_string())).collect()
    }

    /// Fetch each term's postings in full. Terms whose stored postings disagree with the
    /// index are logged and skipped; a failed fetch fails the whole query.
    async fn fetch_postings(&self, terms: &[(String, u32)]) -> Result<Vec<TermPostings>, SearchError> {
        let mut lists = Vec::with_capacity(terms.len());
        for (term, query_tf) in terms {
            let Some(df) = self.body.df(term) else { continue };
            match read_posting_list(self.store.as_ref(), &self.body, term, self.config.block_capacity).await {
                Ok(Some(postings)) => {
                    lists.push(TermPostings { term: term.clone(), query_tf: *query_tf, df, postings })
                }
                Ok(None) => {}
                Err(ReadError::Blob(e)) => {
                    tracing::error!(term = %term, error = %e, "posting fetch failed");
                    return Err(SearchError::Unavailable(e));
                }
                Err(e) => tracing::warn!(term = %term, df, error = %e, "skipping term with inconsistent postings"),
            }
        }
        Ok(lists)
    }
}
