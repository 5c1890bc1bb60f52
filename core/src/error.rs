//! Error types for the statistics kernel.

use thiserror::Error;

use crate::{CollectionId, DocId};

/// Result type alias for kernel operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the kernel and the library around it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    /// A document was created from empty text.
    #[error("document text is empty")]
    EmptyInput,

    /// A bit string or codebook does not resolve to leaves of a prefix tree.
    #[error("malformed huffman code at bit {position}")]
    MalformedCode { position: usize },

    /// The text contains a character the codebook has no entry for.
    #[error("symbol {0:?} is not in the codebook")]
    UnknownSymbol(char),

    /// Caller bookkeeping does not match the collection state.
    #[error("inconsistent collection state: {0}")]
    InconsistentState(String),

    /// Document not found.
    #[error("document not found: {0}")]
    DocumentNotFound(DocId),

    /// Collection not found.
    #[error("collection not found: {0}")]
    CollectionNotFound(CollectionId),
}
