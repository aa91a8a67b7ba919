use std::fmt;

use pagedrop_blob::BlobError;
use pagedrop_meta::MetaError;
use pagedrop_types::Slug;
use thiserror::Error;

/// Failures of the publish service operations.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The caller supplied an empty body, an empty file name, or an unknown
    /// category. Nothing was written.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// Every slug candidate collided. Nothing was written; retry later.
    #[error("no free slug after {attempts} attempts")]
    AllocationExhausted { attempts: u32 },

    /// The document bytes could not be stored. No row was created.
    #[error("failed to store document at {path}: {source}")]
    StorageWriteFailed {
        path: String,
        #[source]
        source: BlobError,
    },

    /// The row insert failed after the bytes were stored. The stored bytes
    /// were deleted again, best-effort.
    #[error("failed to record deployment {slug}: {source}")]
    MetadataWriteFailed {
        slug: Slug,
        #[source]
        source: MetaError,
    },

    /// The stored document for a visible deployment could not be read.
    #[error("failed to read document at {path}: {reason}")]
    StorageReadFailed { path: String, reason: String },

    /// No deployment has this slug or id.
    #[error("deployment not found: {0}")]
    NotFound(String),

    /// The deployment exists but has been unpublished.
    #[error("deployment {slug} has been unpublished")]
    Unpublished { slug: Slug },

    /// The metadata store failed on a lookup, listing, or status update.
    #[error("metadata store unavailable: {0}")]
    MetadataUnavailable(#[source] MetaError),
}

impl PublishError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::InvalidInput(_) => ErrorKind::InvalidInput,
            Self::AllocationExhausted { .. } => ErrorKind::AllocationExhausted,
            Self::StorageWriteFailed { .. } => ErrorKind::StorageWriteFailed,
            Self::MetadataWriteFailed { .. } => ErrorKind::MetadataWriteFailed,
            Self::StorageReadFailed { .. } => ErrorKind::StorageReadFailed,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::Unpublished { .. } => ErrorKind::Unpublished,
            Self::MetadataUnavailable(_) => ErrorKind::MetadataUnavailable,
        }
    }

    /// `NotFound` and `Unpublished` describe a missing or revoked page; they
    /// are ordinary outcomes rather than faults.
    pub fn is_expected(&self) -> bool {
        matches!(self.kind(), ErrorKind::NotFound | ErrorKind::Unpublished)
    }
}

/// Field-less discriminant of [`PublishError`], for callers that map
/// failures to messages or status codes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    InvalidInput,
    AllocationExhausted,
    StorageWriteFailed,
    MetadataWriteFailed,
    StorageReadFailed,
    NotFound,
    Unpublished,
    MetadataUnavailable,
}

impl ErrorKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidInput => "invalid_input",
            Self::AllocationExhausted => "allocation_exhausted",
            Self::StorageWriteFailed => "storage_write_failed",
            Self::MetadataWriteFailed => "metadata_write_failed",
            Self::StorageReadFailed => "storage_read_failed",
            Self::NotFound => "not_found",
            Self::Unpublished => "unpublished",
            Self::MetadataUnavailable => "metadata_unavailable",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub type PublishResult<T> = Result<T, PublishError>;
