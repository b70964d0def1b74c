use pixvault_types::ContentId;

/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The request declared a transfer encoding the store cannot decode.
    #[error("unsupported transfer encoding: {0}")]
    UnsupportedEncoding(String),

    /// The declared content digest disagrees with the computed hash.
    #[error("digest mismatch: claimed {claimed}, computed {computed}")]
    DigestMismatch {
        claimed: ContentId,
        computed: ContentId,
    },

    /// The decoded body exceeds the configured size ceiling. Detected on
    /// the decoded stream, so a small compressed body cannot smuggle an
    /// oversized blob past the transport-level limit.
    #[error("decoded body exceeds {limit} bytes")]
    TooLarge { limit: u64 },

    /// A blob the index points at is missing or unreadable.
    #[error("blob missing for {0}")]
    BlobMissing(ContentId),

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;
