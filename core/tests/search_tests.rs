use rank_core::blob::MemoryBlobStore;
use rank_core::persist::Snapshot;
use rank_core::scoring::bm25::{self, Bm25Params};
use rank_core::scoring::{tfidf, TermPostings};
use rank_core::testing::pack_blocks;
use rank_core::{DocId, DocStore, EngineConfig, Fragment, Hit, Posting, SearchEngine, SearchError, TitleIndex};
use std::collections::HashMap;
use std::sync::Arc;

const BLOCK: usize = 12;

/// N = 100, average length 50; doc 10 has length 40 and doc 20 has length 60.
fn corpus() -> DocStore {
    let mut lengths: HashMap<DocId, u32> = (100..198).map(|d| (d, 50)).collect();
    lengths.insert(10, 40);
    lengths.insert(20, 60);
    let titles: HashMap<DocId, String> = [
        (10, "Ten".to_string()),
        (20, "Twenty".to_string()),
        (100, "Foo Bar".to_string()),
        (101, "Foo".to_string()),
        (102, "Bar".to_string()),
    ]
    .into_iter()
    .collect();
    DocStore::new(lengths, titles, HashMap::new(), HashMap::new())
}

fn title_index() -> TitleIndex {
    let mut t = TitleIndex::new();
    t.postings.insert("foo".into(), vec![101, 100]);
    t.postings.insert("bar".into(), vec![102, 100]);
    t
}

fn engine_with(lists: &[(&str, Vec<Posting>)]) -> (SearchEngine, Arc<MemoryBlobStore>) {
    let (body, store) = pack_blocks(lists, BLOCK, "postings/").into_memory_store();
    let store = Arc::new(store);
    let snapshot = Snapshot { body, titles: title_index(), docs: corpus() };
    let config = EngineConfig { block_capacity: BLOCK, ..EngineConfig::default() };
    (SearchEngine::new(snapshot, store.clone(), config), store)
}

fn ids(hits: &[Hit]) -> Vec<DocId> {
    hits.iter().map(|h| h.0).collect()
}

#[tokio::test]
async fn body_search_ranks_higher_tf_shorter_doc_first() {
    let (engine, _) = engine_with(&[("xenon", vec![Posting::new(10, 3), Posting::new(20, 1)])]);

    let hits = engine.search_body("xenon").await.unwrap();
    assert_eq!(hits, vec![Hit(10, "Ten".into()), Hit(20, "Twenty".into())]);

    let hits = engine.search("xenon").await.unwrap();
    assert_eq!(ids(&hits), vec![10, 20]);
}

#[test]
fn regression_scores_for_single_term_fixture() {
    let docs = corpus();
    let list = TermPostings {
        term: "x".into(),
        query_tf: 1,
        df: 2,
        postings: vec![Posting::new(10, 3), Posting::new(20, 1)],
    };

    let b = bm25::score(std::slice::from_ref(&list), &docs, Bm25Params::default());
    let idf = (98.5f64 / 2.5 + 1.0).ln();
    assert!((b[&10] - idf * 7.5 / (3.0 + 1.5 * 0.85)).abs() < 1e-9);
    assert!((b[&20] - idf * 2.5 / (1.0 + 1.5 * 1.15)).abs() < 1e-9);
    assert!(b[&10] > b[&20]);

    let t = tfidf::score(&[list], &docs);
    let idf = 50.0f64.ln();
    assert!((t[&10] - idf * (3.0 / 40.0) * idf).abs() < 1e-9);
    assert!((t[&20] - idf * (1.0 / 60.0) * idf).abs() < 1e-9);
}

#[tokio::test]
async fn title_search_orders_by_distinct_matches_then_id() {
    let (engine, _) = engine_with(&[]);
    let hits = engine.search_title("foo bar");
    assert_eq!(
        hits,
        vec![Hit(100, "Foo Bar".into()), Hit(101, "Foo".into()), Hit(102, "Bar".into())]
    );
}

#[tokio::test]
async fn fused_search_puts_full_title_match_first() {
    let (engine, _) = engine_with(&[
        ("foo", vec![Posting::new(10, 9), Posting::new(101, 1)]),
        ("bar", vec![Posting::new(20, 9)]),
    ]);
    let hits = engine.search("foo bar").await.unwrap();
    assert_eq!(hits[0], Hit(100, "Foo Bar".into()));
    assert!(ids(&hits).contains(&10));
    assert!(ids(&hits).contains(&20));
}

#[tokio::test]
async fn empty_queries_return_nothing() {
    let (engine, store) = engine_with(&[("xenon", vec![Posting::new(10, 3)])]);
    for q in ["", "   ", "the and of"] {
        assert!(engine.search(q).await.unwrap().is_empty(), "{q:?}");
        assert!(engine.search_body(q).await.unwrap().is_empty(), "{q:?}");
        assert!(engine.search_title(q).is_empty(), "{q:?}");
    }
    assert_eq!(store.fetches(), 0);
}

#[tokio::test]
async fn unknown_terms_are_ignored() {
    let (engine, _) = engine_with(&[("xenon", vec![Posting::new(10, 3), Posting::new(20, 1)])]);
    let plain = engine.search_body("xenon").await.unwrap();
    let noisy = engine.search_body("xenon zebra").await.unwrap();
    assert_eq!(plain, noisy);
}

#[tokio::test]
async fn repeated_query_terms_read_postings_once() {
    let (engine, store) = engine_with(&[("xenon", vec![Posting::new(10, 3)])]);
    engine.search_body("xenon xenon xenon").await.unwrap();
    assert_eq!(store.fetches(), 1);
}

#[tokio::test]
async fn missing_blob_fails_the_request() {
    let mut body = rank_core::TermIndex::new();
    body.df.insert("xenon".into(), 1);
    body.posting_locs.insert("xenon".into(), vec![Fragment::new("gone.bin", 0)]);
    let snapshot = Snapshot { body, titles: TitleIndex::new(), docs: corpus() };
    let engine = SearchEngine::new(snapshot, Arc::new(MemoryBlobStore::new()), EngineConfig::default());

    assert!(matches!(engine.search_body("xenon").await, Err(SearchError::Unavailable(_))));
    assert!(matches!(engine.search("xenon").await, Err(SearchError::Unavailable(_))));
}

#[tokio::test]
async fn inconsistent_term_is_skipped() {
    let (mut body, store) = pack_blocks(&[("xenon", vec![Posting::new(10, 3)]), ("yttrium", vec![Posting::new(20, 2)])], BLOCK, "")
        .into_memory_store();
    // Claim more postings than the locations can cover.
    body.df.insert("yttrium".into(), 5);
    let snapshot = Snapshot { body, titles: TitleIndex::new(), docs: corpus() };
    let config = EngineConfig { block_capacity: BLOCK, ..EngineConfig::default() };
    let engine = SearchEngine::new(snapshot, Arc::new(store), config);

    let hits = engine.search_body("xenon yttrium").await.unwrap();
    assert_eq!(ids(&hits), vec![10]);
}

#[tokio::test]
async fn pagerank_and_pageviews_default_to_zero() {
    let docs = DocStore::new(
        HashMap::new(),
        HashMap::new(),
        [(1, 0.25)].into_iter().collect(),
        [(2, 7)].into_iter().collect(),
    );
    let snapshot = Snapshot { body: Default::default(), titles: TitleIndex::new(), docs };
    let engine = SearchEngine::new(snapshot, Arc::new(MemoryBlobStore::new()), EngineConfig::default());
    assert_eq!(engine.pagerank(&[1, 2]), vec![0.25, 0.0]);
    assert_eq!(engine.pageviews(&[1, 2]), vec![0, 7]);
}
