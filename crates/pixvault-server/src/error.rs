use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use thiserror::Error;

use pixvault_index::IndexError;
use pixvault_rendition::RenditionError;
use pixvault_store::StoreError;

/// Everything the HTTP surface can answer with, mapped onto the response
/// status codes of the API.
///
/// All pipeline failures are detected at the boundary of each step and
/// turned into one of these; nothing is retried here.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("unauthenticated")]
    Unauthenticated,

    #[error("accept image only")]
    UnsupportedMedia,

    #[error("malformed request: {0}")]
    BadRequest(String),

    #[error("unsupported transfer encoding: {0}")]
    UnsupportedEncoding(String),

    #[error("Content-Digest sha-256 required")]
    DigestMissing,

    #[error("digest mismatch")]
    DigestMismatch,

    /// The decoded body exceeds the configured upload ceiling.
    #[error("body too large: limit {0} bytes")]
    TooLarge(u64),

    /// Existing record, no validator supplied.
    #[error("existed")]
    Existed,

    /// Validator mismatch against the current version.
    #[error("precondition failed")]
    PreconditionFailed,

    /// The client claimed a prior version but no record exists.
    #[error("gone")]
    Gone,

    #[error("not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    /// A record exists but its blob is missing or unreadable.
    #[error("index inconsistency: {0}")]
    IndexInconsistency(String),

    /// The storage or index backend failed.
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Unauthenticated => StatusCode::UNAUTHORIZED,
            Self::UnsupportedMedia => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            Self::BadRequest(_)
            | Self::UnsupportedEncoding(_)
            | Self::DigestMissing
            | Self::DigestMismatch => StatusCode::BAD_REQUEST,
            Self::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            Self::Existed => StatusCode::FORBIDDEN,
            Self::PreconditionFailed => StatusCode::PRECONDITION_FAILED,
            Self::Gone => StatusCode::GONE,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::IndexInconsistency(_) | Self::StorageUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::warn!(%status, error = %self, "request failed");
        }
        let body = Json(json!({
            "code": status.as_u16(),
            "msg": self.to_string(),
        }));
        (status, body).into_response()
    }
}

impl From<StoreError> for ApiError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::UnsupportedEncoding(e) => Self::UnsupportedEncoding(e),
            StoreError::DigestMismatch { .. } => Self::DigestMismatch,
            StoreError::TooLarge { limit } => Self::TooLarge(limit),
            StoreError::BlobMissing(id) => Self::IndexInconsistency(format!("blob missing: {id}")),
            StoreError::Io(e) => Self::StorageUnavailable(e.to_string()),
        }
    }
}

impl From<IndexError> for ApiError {
    fn from(err: IndexError) -> Self {
        match err {
            IndexError::NotFound { .. } => Self::NotFound,
            // Context-specific conflict mapping (insert vs. update) happens
            // in the service; anything that reaches here is an update race.
            IndexError::Conflict { .. } => Self::PreconditionFailed,
            IndexError::InvalidRange(r) => Self::BadRequest(format!("invalid range: {r}")),
            IndexError::Backend(e) => Self::StorageUnavailable(e),
        }
    }
}

impl From<RenditionError> for ApiError {
    fn from(err: RenditionError) -> Self {
        match err {
            RenditionError::NotFound => Self::NotFound,
            RenditionError::InvalidKind(_) => Self::MethodNotAllowed,
            RenditionError::SourceUnreadable(e) => Self::IndexInconsistency(e),
            RenditionError::Processor(e) => Self::StorageUnavailable(e),
            RenditionError::Store(e) => e.into(),
            RenditionError::Index(e) => e.into(),
        }
    }
}
