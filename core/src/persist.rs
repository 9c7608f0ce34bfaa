use crate::{DocId, DocStore, TermIndex, TitleIndex};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::collections::HashMap;
use std::fs::{create_dir_all, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

/// File layout of a snapshot directory.
pub struct IndexPaths {
    pub root: PathBuf,
}

impl IndexPaths {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self { root: root.as_ref().to_path_buf() }
    }
    pub fn body_index(&self) -> PathBuf { self.root.join("index.bin") }
    pub fn title_postings(&self) -> PathBuf { self.root.join("title_postings.bin") }
    pub fn doc_lengths(&self) -> PathBuf { self.root.join("doc_lengths.bin") }
    pub fn doc_titles(&self) -> PathBuf { self.root.join("doc_titles.bin") }
    pub fn pagerank(&self) -> PathBuf { self.root.join("pagerank.bin") }
    pub fn pageviews(&self) -> PathBuf { self.root.join("pageviews.bin") }
    /// Default location of posting blobs when served from local disk.
    pub fn postings_dir(&self) -> PathBuf { self.root.join("postings") }
}

/// Everything a query needs besides the posting blobs themselves.
pub struct Snapshot {
    pub body: TermIndex,
    pub titles: TitleIndex,
    pub docs: DocStore,
}

fn save_bin<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    if let Some(dir) = path.parent() {
        create_dir_all(dir)?;
    }
    let mut f = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut f, value)?;
    f.flush()?;
    Ok(())
}

fn load_bin<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let f = File::open(path).with_context(|| format!("opening {}", path.display()))?;
    let value = bincode::deserialize_from(BufReader::new(f))
        .with_context(|| format!("decoding {}", path.display()))?;
    Ok(value)
}

pub fn save_body_index(paths: &IndexPaths, index: &TermIndex) -> Result<()> {
    save_bin(&paths.body_index(), index)
}

pub fn load_body_index(paths: &IndexPaths) -> Result<TermIndex> {
    load_bin(&paths.body_index())
}

pub fn save_title_index(paths: &IndexPaths, index: &TitleIndex) -> Result<()> {
    save_bin(&paths.title_postings(), index)
}

pub fn load_title_index(paths: &IndexPaths) -> Result<TitleIndex> {
    load_bin(&paths.title_postings())
}

pub fn save_doc_lengths(paths: &IndexPaths, lengths: &HashMap<DocId, u32>) -> Result<()> {
    save_bin(&paths.doc_lengths(), lengths)
}

pub fn save_doc_titles(paths: &IndexPaths, titles: &HashMap<DocId, String>) -> Result<()> {
    save_bin(&paths.doc_titles(), titles)
}

pub fn save_pagerank(paths: &IndexPaths, pagerank: &HashMap<DocId, f64>) -> Result<()> {
    save_bin(&paths.pagerank(), pagerank)
}

pub fn save_pageviews(paths: &IndexPaths, pageviews: &HashMap<DocId, u64>) -> Result<()> {
    save_bin(&paths.pageviews(), pageviews)
}

pub fn save_doc_store(paths: &IndexPaths, docs: &DocStore) -> Result<()> {
    save_doc_lengths(paths, docs.lengths())?;
    save_doc_titles(paths, docs.titles())?;
    save_pagerank(paths, docs.pageranks())?;
    save_pageviews(paths, docs.pageviews())?;
    Ok(())
}

/// Load per-document metadata. Page views are optional; every other file is required.
pub fn load_doc_store(paths: &IndexPaths) -> Result<DocStore> {
    let lengths: HashMap<DocId, u32> = load_bin(&paths.doc_lengths())?;
    tracing::info!(docs = lengths.len(), "doc lengths loaded");
    let titles: HashMap<DocId, String> = load_bin(&paths.doc_titles())?;
    tracing::info!(docs = titles.len(), "doc titles loaded");
    let pagerank: HashMap<DocId, f64> = load_bin(&paths.pagerank())?;
    tracing::info!(docs = pagerank.len(), "pagerank loaded");
    let pageviews: HashMap<DocId, u64> = if paths.pageviews().exists() {
        let pv: HashMap<DocId, u64> = load_bin(&paths.pageviews())?;
        tracing::info!(docs = pv.len(), "pageviews loaded");
        pv
    } else {
        tracing::warn!(path = %paths.pageviews().display(), "pageviews not found, defaulting to 0");
        HashMap::new()
    };
    Ok(DocStore::new(lengths, titles, pagerank, pageviews))
}

/// Load the full snapshot needed to serve queries.
pub fn load_snapshot(paths: &IndexPaths) -> Result<Snapshot> {
    let body = load_body_index(paths)?;
    tracing::info!(terms = body.len(), "body index loaded");
    let titles = load_title_index(paths)?;
    tracing::info!(terms = titles.len(), "title postings loaded");
    let docs = load_doc_store(paths)?;
    tracing::info!(num_docs = docs.num_docs(), avg_doc_len = docs.avg_doc_len(), "snapshot loaded");
    Ok(Snapshot { body, titles, docs })
}

pub fn save_snapshot(paths: &IndexPaths, snapshot: &Snapshot) -> Result<()> {
    save_body_index(paths, &snapshot.body)?;
    save_title_index(paths, &snapshot.titles)?;
    save_doc_store(paths, &snapshot.docs)?;
    Ok(())
}
