//! Read-only access to the immutable files that hold posting blocks.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Component, Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("invalid blob id: {0:?}")]
    InvalidId(String),
    #[error("io error reading blob {blob}: {source}")]
    Io {
        blob: String,
        #[source]
        source: std::io::Error,
    },
    #[error("http error fetching blob {blob}: {message}")]
    Http { blob: String, message: String },
}

/// Whole-blob fetches by id. Implementations must be shareable across concurrent requests.
#[async_trait]
pub trait BlobStore: Send + Sync {
    async fn fetch(&self, blob: &str) -> Result<Vec<u8>, BlobError>;
}

/// Blobs stored as files under a root directory.
#[derive(Debug, Clone)]
pub struct FsBlobStore {
    root: PathBuf,
}

impl FsBlobStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }

    pub fn root(&self) -> &Path { &self.root }

    fn resolve(&self, blob: &str) -> Result<PathBuf, BlobError> {
        let rel = Path::new(blob);
        let clean = !blob.is_empty() && rel.components().all(|c| matches!(c, Component::Normal(_)));
        if !clean {
            return Err(BlobError::InvalidId(blob.to_string()));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn fetch(&self, blob: &str) -> Result<Vec<u8>, BlobError> {
        let path = self.resolve(blob)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(BlobError::NotFound(blob.to_string())),
            Err(source) => Err(BlobError::Io { blob: blob.to_string(), source }),
        }
    }
}

/// Blobs served over plain HTTP GET as `<base_url>/<blob>`, e.g. a public bucket.
#[derive(Debug, Clone)]
pub struct HttpBlobStore {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBlobStore {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(reqwest::Client::new(), base_url)
    }

    pub fn with_client(client: reqwest::Client, base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client, base_url }
    }

    pub fn url_for(&self, blob: &str) -> String {
        format!("{}/{}", self.base_url, blob.trim_start_matches('/'))
    }
}

#[async_trait]
impl BlobStore for HttpBlobStore {
    async fn fetch(&self, blob: &str) -> Result<Vec<u8>, BlobError> {
        let http_err = |message: String| BlobError::Http { blob: blob.to_string(), message };
        let resp = self
            .client
            .get(self.url_for(blob))
            .send()
            .await
            .map_err(|e| http_err(e.to_string()))?;
        let status = resp.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(BlobError::NotFound(blob.to_string()));
        }
        if !status.is_success() {
            return Err(http_err(format!("status {status}")));
        }
        let bytes = resp.bytes().await.map_err(|e| http_err(e.to_string()))?;
        Ok(bytes.to_vec())
    }
}

/// In-memory blobs, mainly for fixtures. Counts fetches so callers can observe caching.
#[derive(Debug, Default)]
pub struct MemoryBlobStore {
    blobs: HashMap<String, Vec<u8>>,
    fetches: AtomicUsize,
}

impl MemoryBlobStore {
    pub fn new() -> Self { Self::default() }

    pub fn with_blob(mut self, blob: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(blob, bytes);
        self
    }

    pub fn insert(&mut self, blob: impl Into<String>, bytes: Vec<u8>) {
        self.blobs.insert(blob.into(), bytes);
    }

    /// Total successful and failed fetch calls so far.
    pub fn fetches(&self) -> usize { self.fetches.load(Ordering::Relaxed) }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn fetch(&self, blob: &str) -> Result<Vec<u8>, BlobError> {
        self.fetches.fetch_add(1, Ordering::Relaxed);
        self.blobs
            .get(blob)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(blob.to_string()))
    }
}
