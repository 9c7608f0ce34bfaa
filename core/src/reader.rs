//! Reassembles a term's posting bytes from fixed-capacity blocks spread over blobs.

use crate::blob::{BlobError, BlobStore};
use crate::codec::{self, CodecError};
use crate::index::{Fragment, Posting, TermIndex};
use std::collections::HashMap;
use thiserror::Error;

/// Capacity of every storage block, in bytes. A multiple of the 6-byte tuple size.
pub const BLOCK_CAPACITY: usize = 1_999_998;

#[derive(Debug, Error)]
pub enum ReadError {
    #[error(transparent)]
    Blob(#[from] BlobError),
    #[error("posting locations cover {covered} of {needed} bytes")]
    Truncated { needed: usize, covered: usize },
    #[error("blob {blob} holds {len} bytes, fragment needs {needed} from offset {offset}")]
    ShortBlob { blob: String, offset: usize, needed: usize, len: usize },
    #[error(transparent)]
    Codec(#[from] CodecError),
}

impl ReadError {
    /// True when the stored data disagrees with the term index, as opposed to a failed fetch.
    pub fn is_integrity(&self) -> bool { !matches!(self, ReadError::Blob(_)) }
}

/// A single-use reader. Blobs are fetched lazily, at most once each, and the cache
/// goes away with the reader.
pub struct ChunkedReader<'a> {
    store: &'a dyn BlobStore,
    block_capacity: usize,
    cache: HashMap<String, Vec<u8>>,
}

impl<'a> ChunkedReader<'a> {
    pub fn new(store: &'a dyn BlobStore, block_capacity: usize) -> Self {
        Self { store, block_capacity, cache: HashMap::new() }
    }

    /// Concatenate exactly `n_bytes` starting at the first fragment, moving to the next
    /// fragment at each block boundary.
    pub async fn read(&mut self, locs: &[Fragment], n_bytes: usize) -> Result<Vec<u8>, ReadError> {
        let mut out = Vec::with_capacity(n_bytes);
        let mut remaining = n_bytes;
        for frag in locs {
            if remaining == 0 {
                break;
            }
            let offset = usize::try_from(frag.offset).unwrap_or(usize::MAX);
            let take = remaining.min(self.block_capacity.saturating_sub(offset));
            if take == 0 {
                continue;
            }
            let data = self.blob(&frag.blob).await?;
            match data.get(offset..offset + take) {
                Some(chunk) => out.extend_from_slice(chunk),
                None => {
                    return Err(ReadError::ShortBlob {
                        blob: frag.blob.clone(),
                        offset,
                        needed: take,
                        len: data.len(),
                    })
                }
            }
            remaining -= take;
        }
        if remaining > 0 {
            return Err(ReadError::Truncated { needed: n_bytes, covered: n_bytes - remaining });
        }
        Ok(out)
    }

    /// Number of distinct blobs fetched by this reader.
    pub fn cached_blobs(&self) -> usize { self.cache.len() }

    async fn blob(&mut self, blob: &str) -> Result<&[u8], BlobError> {
        if !self.cache.contains_key(blob) {
            let bytes = self.store.fetch(blob).await?;
            tracing::trace!(blob, len = bytes.len(), "fetched blob");
            self.cache.insert(blob.to_string(), bytes);
        }
        Ok(self.cache.get(blob).map(Vec::as_slice).unwrap_or_default())
    }
}

/// Read and decode one term's posting list. `Ok(None)` when the term is not indexed.
pub async fn read_posting_list(
    store: &dyn BlobStore,
    index: &TermIndex,
    term: &str,
    block_capacity: usize,
) -> Result<Option<Vec<Posting>>, ReadError> {
    let (Some(df), Some(locs)) = (index.df(term), index.locations(term)) else {
        return Ok(None);
    };
    let count = df as usize;
    let bytes = ChunkedReader::new(store, block_capacity).read(locs, codec::byte_len(count)).await?;
    Ok(Some(codec::decode(&bytes, count)?))
}
