use pixvault_types::RenditionKind;
use thiserror::Error;

/// Errors from rendition derivation.
#[derive(Debug, Error)]
pub enum RenditionError {
    /// No record exists for the requested resource.
    #[error("picture not found")]
    NotFound,

    /// The requested kind cannot be derived (only derived kinds are valid).
    #[error("cannot derive rendition kind: {0}")]
    InvalidKind(RenditionKind),

    /// The record exists but its original blob is missing or unreadable —
    /// an index/storage inconsistency, distinct from not-found.
    #[error("original blob unreadable: {0}")]
    SourceUnreadable(String),

    /// The image-processing collaborator failed.
    #[error("image processing failed: {0}")]
    Processor(String),

    #[error("store error: {0}")]
    Store(#[from] pixvault_store::StoreError),

    #[error("index error: {0}")]
    Index(#[from] pixvault_index::IndexError),
}

/// Result alias for rendition operations.
pub type RenditionResult<T> = Result<T, RenditionError>;
