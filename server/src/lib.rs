use anyhow::Result;
use axum::body::Bytes;
use axum::{extract::{Query, State}, http::StatusCode, routing::{get, post}, Json, Router};
use rank_core::blob::{BlobStore, FsBlobStore, HttpBlobStore};
use rank_core::persist::{load_snapshot, IndexPaths};
use rank_core::{DocId, EngineConfig, Hit, SearchEngine, SearchError};
use serde::Deserialize;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

#[derive(Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub query: String,
}

/// Everything needed to stand up the service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub index_dir: PathBuf,
    pub blob_dir: Option<PathBuf>,
    pub blob_url: Option<String>,
    pub request_timeout: Duration,
    pub engine: EngineConfig,
}

impl ServerConfig {
    pub fn new(index_dir: impl Into<PathBuf>) -> Self {
        Self {
            index_dir: index_dir.into(),
            blob_dir: None,
            blob_url: None,
            request_timeout: Duration::from_secs(30),
            engine: EngineConfig::default(),
        }
    }
}

/// HTTP store when a base URL is configured, otherwise files under the blob dir
/// (defaulting to `<index>/postings`).
pub fn blob_store(config: &ServerConfig) -> Arc<dyn BlobStore> {
    match &config.blob_url {
        Some(url) => {
            tracing::info!(%url, "serving postings over http");
            Arc::new(HttpBlobStore::new(url.clone()))
        }
        None => {
            let dir = config
                .blob_dir
                .clone()
                .unwrap_or_else(|| IndexPaths::new(&config.index_dir).postings_dir());
            tracing::info!(dir = %dir.display(), "serving postings from disk");
            Arc::new(FsBlobStore::new(dir))
        }
    }
}

pub fn build_app(config: &ServerConfig) -> Result<Router> {
    // Load the snapshot at startup; a missing file is fatal.
    let snapshot = load_snapshot(&IndexPaths::new(&config.index_dir))?;
    let engine = SearchEngine::new(snapshot, blob_store(config), config.engine);
    Ok(router(Arc::new(engine), config.request_timeout))
}

pub fn router(engine: Arc<SearchEngine>, request_timeout: Duration) -> Router {
    // CORS: read CORS_ALLOW_ORIGIN (comma-separated) or allow Any by default
    let cors = match std::env::var("CORS_ALLOW_ORIGIN") {
        Ok(val) => {
            let origins: Vec<_> = val
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
            if origins.is_empty() {
                CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any)
            } else {
                CorsLayer::new().allow_origin(AllowOrigin::list(origins)).allow_methods(Any).allow_headers(Any)
            }
        }
        Err(_) => CorsLayer::new().allow_origin(Any).allow_methods(Any).allow_headers(Any),
    };

    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/search", get(search_handler))
        .route("/search_body", get(search_body_handler))
        .route("/search_title", get(search_title_handler))
        .route("/get_pagerank", post(pagerank_handler))
        .route("/get_pageview", post(pageview_handler))
        .with_state(engine)
        .layer(TimeoutLayer::new(request_timeout))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
}

type ApiResult<T> = Result<Json<T>, (StatusCode, String)>;

fn unavailable(err: SearchError) -> (StatusCode, String) {
    (StatusCode::SERVICE_UNAVAILABLE, err.to_string())
}

pub async fn search_handler(State(engine): State<Arc<SearchEngine>>, Query(params): Query<SearchParams>) -> ApiResult<Vec<Hit>> {
    engine.search(&params.query).await.map(Json).map_err(unavailable)
}

pub async fn search_body_handler(State(engine): State<Arc<SearchEngine>>, Query(params): Query<SearchParams>) -> ApiResult<Vec<Hit>> {
    engine.search_body(&params.query).await.map(Json).map_err(unavailable)
}

pub async fn search_title_handler(State(engine): State<Arc<SearchEngine>>, Query(params): Query<SearchParams>) -> Json<Vec<Hit>> {
    Json(engine.search_title(&params.query))
}

pub async fn pagerank_handler(State(engine): State<Arc<SearchEngine>>, body: Bytes) -> ApiResult<Vec<f64>> {
    let ids = parse_ids(&body)?;
    Ok(Json(engine.pagerank(&ids)))
}

pub async fn pageview_handler(State(engine): State<Arc<SearchEngine>>, body: Bytes) -> ApiResult<Vec<u64>> {
    let ids = parse_ids(&body)?;
    Ok(Json(engine.pageviews(&ids)))
}

/// An id as sent by clients: a JSON number or a numeric string.
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Num(DocId),
    Str(String),
}

fn bad_ids(msg: impl std::fmt::Display) -> (StatusCode, String) {
    (StatusCode::BAD_REQUEST, format!("expected a JSON array of ids: {msg}"))
}

/// A JSON array of ids. An empty body or `null` means no ids.
fn parse_ids(body: &[u8]) -> Result<Vec<DocId>, (StatusCode, String)> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(vec![]);
    }
    let raw = serde_json::from_slice::<Option<Vec<RawId>>>(body).map_err(bad_ids)?;
    raw.unwrap_or_default()
        .into_iter()
        .map(|id| match id {
            RawId::Num(n) => Ok(n),
            RawId::Str(s) => s.trim().parse::<DocId>().map_err(|e| bad_ids(format!("{s:?}: {e}"))),
        })
        .collect()
}
