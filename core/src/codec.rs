//! Fixed-width posting encoding.
//!
//! A posting list is a packed run of 6-byte tuples, `[doc_id: u32 BE][tf: u16 BE]`,
//! with no header, padding or checksum. The tuple count comes from the term's
//! document frequency, never from the bytes themselves.

use crate::index::Posting;
use thiserror::Error;

pub const TUPLE_SIZE: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    #[error("posting buffer too short: {count} tuples need {needed} bytes, got {got}")]
    ShortBuffer { count: usize, needed: usize, got: usize },
}

/// Number of bytes a posting list with `count` entries occupies.
pub fn byte_len(count: usize) -> usize { count * TUPLE_SIZE }

pub fn encode(postings: &[Posting]) -> Vec<u8> {
    let mut out = Vec::with_capacity(byte_len(postings.len()));
    for p in postings {
        out.extend_from_slice(&p.doc_id.to_be_bytes());
        out.extend_from_slice(&p.tf.to_be_bytes());
    }
    out
}

/// Decode exactly `count` tuples from the front of `bytes`. Trailing bytes are ignored.
pub fn decode(bytes: &[u8], count: usize) -> Result<Vec<Posting>, CodecError> {
    let needed = byte_len(count);
    if bytes.len() < needed {
        return Err(CodecError::ShortBuffer { count, needed, got: bytes.len() });
    }
    let postings = bytes[..needed]
        .chunks_exact(TUPLE_SIZE)
        .map(|t| Posting {
            doc_id: u32::from_be_bytes([t[0], t[1], t[2], t[3]]),
            tf: u16::from_be_bytes([t[4], t[5]]),
        })
        .collect();
    Ok(postings)
}
