use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use pagedrop_publish::{ErrorKind, PublishError};
use serde_json::json;
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum ServerError {
    #[error(transparent)]
    Publish(#[from] PublishError),

    #[error("bad request: {0}")]
    BadRequest(String),

    #[error("request body rejected: {message}")]
    Rejected { status: StatusCode, message: String },

    #[error("blob store error: {0}")]
    Blob(#[from] pagedrop_blob::BlobError),

    #[error("metadata store error: {0}")]
    Meta(#[from] pagedrop_meta::MetaError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ServerResult<T> = Result<T, ServerError>;

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Publish(e) => match e.kind() {
                ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::Unpublished => StatusCode::GONE,
                ErrorKind::StorageReadFailed => StatusCode::BAD_GATEWAY,
                ErrorKind::AllocationExhausted
                | ErrorKind::StorageWriteFailed
                | ErrorKind::MetadataWriteFailed
                | ErrorKind::MetadataUnavailable => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Rejected { status, .. } if *status == StatusCode::PAYLOAD_TOO_LARGE => *status,
            Self::Rejected { .. } => StatusCode::BAD_REQUEST,
            Self::Blob(_) | Self::Meta(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    /// Short machine-readable name carried in the `error` field.
    pub fn code(&self) -> &'static str {
        match self {
            Self::Publish(e) => e.kind().as_str(),
            Self::BadRequest(_) => "invalid_input",
            Self::Rejected { status, .. } if *status == StatusCode::PAYLOAD_TOO_LARGE => {
                "payload_too_large"
            }
            Self::Rejected { .. } => "invalid_input",
            Self::Blob(_) | Self::Meta(_) | Self::Config(_) | Self::Io(_) | Self::Internal(_) => {
                "internal"
            }
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(code = self.code(), error = %self, "request failed");
        } else {
            debug!(code = self.code(), error = %self, "request refused");
        }
        let body = json!({
            "error": self.code(),
            "details": self.to_string(),
        });
        (status, Json(body)).into_response()
    }
}
