//! Text statistics kernel: tokenization, Huffman coding of raw text, per-document
//! word statistics and incrementally maintained collection statistics.

pub mod collection;
pub mod document;
pub mod error;
pub mod huffman;
pub mod library;
pub mod persist;
pub mod stats;
pub mod tokenizer;

pub use collection::{aggregate_add, aggregate_remove, CollectionStat, CollectionState};
pub use document::DocumentRecord;
pub use error::{Error, Result};
pub use huffman::{build_codec, decode, Codebook, Encoded, HuffmanTree};
pub use library::{Collection, Library, LibrarySnapshot, Metrics};
pub use stats::{compute_document_stats, DocumentStats, WordStat};

pub type DocId = u32;
pub type CollectionId = u32;

/// Page size used by statistics listings when the caller does not pass one.
pub const DEFAULT_PAGE_LIMIT: usize = 50;
