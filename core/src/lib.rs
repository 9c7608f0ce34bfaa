pub mod blob;
pub mod codec;
pub mod index;
pub mod persist;
pub mod reader;
pub mod scoring;
pub mod search;
pub mod testing;
pub mod tokenizer;

pub use index::{DocId, DocStore, Fragment, Posting, TermIndex, TitleIndex};
pub use search::{EngineConfig, Hit, SearchEngine, SearchError};
