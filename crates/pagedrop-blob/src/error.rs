/// Errors from blob store operations.
#[derive(Debug, thiserror::Error)]
pub enum BlobError {
    /// A blob already exists at the path; stores never overwrite.
    #[error("blob already exists: {0}")]
    AlreadyExists(String),

    /// The path is empty, absolute, or escapes the store root.
    #[error("invalid blob path {path:?}: {reason}")]
    InvalidPath { path: String, reason: String },

    /// I/O error from the underlying storage backend.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backend is unreachable or refused the request.
    #[error("blob backend unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for blob store operations.
pub type BlobResult<T> = Result<T, BlobError>;
