use thiserror::Error;

/// Errors produced when parsing pagedrop types from untrusted input.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid slug {slug:?}: {reason}")]
    InvalidSlug { slug: String, reason: String },

    #[error("unknown category: {0}")]
    UnknownCategory(String),

    #[error("unknown deployment status: {0}")]
    UnknownStatus(String),

    #[error("invalid deployment id: {0}")]
    InvalidId(String),
}
