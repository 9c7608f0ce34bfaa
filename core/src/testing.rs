//! Fixture helpers: lay posting lists out into blocks the way the offline index does,
//! so tests can exercise the real read path without a prebuilt corpus.

use crate::blob::MemoryBlobStore;
use crate::codec;
use crate::index::{Fragment, Posting, TermIndex};
use std::path::Path;

/// Blocks produced by [`pack_blocks`] plus the term index pointing into them.
#[derive(Debug, Default)]
pub struct PackedBlocks {
    pub index: TermIndex,
    pub blobs: Vec<(String, Vec<u8>)>,
}

impl PackedBlocks {
    pub fn into_memory_store(self) -> (TermIndex, MemoryBlobStore) {
        let mut store = MemoryBlobStore::new();
        for (name, bytes) in self.blobs {
            store.insert(name, bytes);
        }
        (self.index, store)
    }

    pub fn write_to_dir(&self, dir: &Path) -> std::io::Result<()> {
        for (name, bytes) in &self.blobs {
            let path = dir.join(name);
            if let Some(parent) = path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(path, bytes)?;
        }
        Ok(())
    }
}

/// Append each list, in order, to a sequence of blocks named `{prefix}{n:03}.bin`.
/// A list that runs past the end of a block continues at offset 0 of the next one.
pub fn pack_blocks(lists: &[(&str, Vec<Posting>)], block_capacity: usize, prefix: &str) -> PackedBlocks {
    let mut packed = PackedBlocks::default();
    let mut current: Vec<u8> = Vec::with_capacity(block_capacity);
    let block_name = |n: usize| format!("{prefix}{n:03}.bin");

    for (term, postings) in lists {
        let bytes = codec::encode(postings);
        let mut locs = Vec::new();
        let mut pos = 0;
        while pos < bytes.len() {
            if current.len() == block_capacity {
                let n = packed.blobs.len();
                packed.blobs.push((block_name(n), std::mem::take(&mut current)));
            }
            locs.push(Fragment::new(block_name(packed.blobs.len()), current.len() as u64));
            let take = (block_capacity - current.len()).min(bytes.len() - pos);
            current.extend_from_slice(&bytes[pos..pos + take]);
            pos += take;
        }
        packed.index.df.insert(term.to_string(), postings.len() as u32);
        packed.index.posting_locs.insert(term.to_string(), locs);
    }
    if !current.is_empty() {
        let n = packed.blobs.len();
        packed.blobs.push((block_name(n), current));
    }
    packed
}
