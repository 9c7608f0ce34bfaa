use anyhow::Result;
use axum::Router;
use clap::Parser;
use rank_core::reader::BLOCK_CAPACITY;
use rank_core::scoring::bm25::Bm25Params;
use rank_core::EngineConfig;
use rank_server::{build_app, ServerConfig};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tokio::net::TcpListener;
use tracing_subscriber::{fmt, EnvFilter};

#[derive(Parser)]
#[command(name = "rank-server")]
#[command(about = "Serve ranked results over a precomputed full-text index", long_about = None)]
struct Args {
    /// Snapshot directory (term index, title postings, document metadata)
    #[arg(long, env = "RANK_INDEX", default_value = "./index")]
    index: PathBuf,
    /// Directory holding posting blobs; defaults to <index>/postings
    #[arg(long, env = "RANK_BLOB_DIR")]
    blob_dir: Option<PathBuf>,
    /// HTTP base URL for posting blobs; overrides --blob-dir
    #[arg(long, env = "RANK_BLOB_URL")]
    blob_url: Option<String>,
    /// Host to bind
    #[arg(long, env = "RANK_HOST", default_value = "0.0.0.0")]
    host: String,
    /// Port to bind
    #[arg(long, env = "RANK_PORT", default_value_t = 8080)]
    port: u16,
    /// Per-request timeout in seconds
    #[arg(long, env = "RANK_TIMEOUT_SECS", default_value_t = 30)]
    timeout_secs: u64,
    /// BM25 term frequency saturation
    #[arg(long, env = "RANK_BM25_K1", default_value_t = 1.5)]
    k1: f64,
    /// BM25 length normalization
    #[arg(long, env = "RANK_BM25_B", default_value_t = 0.75)]
    b: f64,
    /// Posting block size in bytes
    #[arg(long, env = "RANK_BLOCK_CAPACITY", default_value_t = BLOCK_CAPACITY)]
    block_capacity: usize,
    /// Results kept by /search and /search_body
    #[arg(long, env = "RANK_TOP_K", default_value_t = 100)]
    top_k: usize,
}

impl Args {
    fn into_config(self) -> ServerConfig {
        ServerConfig {
            index_dir: self.index,
            blob_dir: self.blob_dir,
            blob_url: self.blob_url,
            request_timeout: Duration::from_secs(self.timeout_secs),
            engine: EngineConfig {
                bm25: Bm25Params { k1: self.k1, b: self.b },
                block_capacity: self.block_capacity,
                top_k: self.top_k,
            },
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();
    let args = Args::parse();
    let addr: SocketAddr = format!("{}:{}", args.host, args.port).parse()?;
    let config = args.into_config();
    tracing::info!(index = %config.index_dir.display(), "loading snapshot");
    let app: Router = build_app(&config)?;

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
