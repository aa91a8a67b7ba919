//! Error types for metadata operations.

use pagedrop_types::{DeploymentId, DeploymentStatus, Slug};
use thiserror::Error;

/// Errors that can occur during metadata operations.
#[derive(Debug, Error)]
pub enum MetaError {
    /// A row with this slug already exists. Slugs are never reused.
    #[error("slug already taken: {slug}")]
    SlugConflict { slug: Slug },

    /// No row has this id.
    #[error("deployment not found: {id}")]
    NotFound { id: DeploymentId },

    /// The requested status change is not allowed.
    #[error("cannot move deployment {id} from {from} to {to}")]
    InvalidTransition {
        id: DeploymentId,
        from: DeploymentStatus,
        to: DeploymentStatus,
    },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// I/O error during file-backed operations.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The store's internal state is unusable (e.g. a poisoned lock).
    #[error("metadata store unavailable: {0}")]
    Unavailable(String),
}

/// Convenience type alias for metadata operations.
pub type MetaResult<T> = std::result::Result<T, MetaError>;
