use thiserror::Error;

/// Errors from index operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum IndexError {
    /// No row exists for the requested `(owner, name)`.
    #[error("record not found: {owner}/{name}")]
    NotFound { owner: String, name: String },

    /// Commit-time conflict: the row changed between decision and commit,
    /// or an insert raced with another first write.
    #[error("commit conflict on {owner}/{name}: {reason}")]
    Conflict {
        owner: String,
        name: String,
        reason: String,
    },

    /// A malformed range specification.
    #[error("invalid range: {0}")]
    InvalidRange(String),

    /// Failure inside the backing store.
    #[error("index backend error: {0}")]
    Backend(String),
}

/// Result alias for index operations.
pub type IndexResult<T> = Result<T, IndexError>;
