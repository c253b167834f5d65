use axum::response::{IntoResponse, Response};
use axum_helpers::{AppError, ErrorCode};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TagError {
    /// Empty name or keyword, zero ID, or an over-long name
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Tag {0} not found")]
    NotFound(i64),

    #[error("Tag store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Search backend unavailable: {0}")]
    SearchBackendUnavailable(String),

    /// A link points at a tag the store does not return
    #[error("Internal inconsistency: {0}")]
    InternalInconsistency(String),
}

pub type TagResult<T> = Result<T, TagError>;

/// Failures talking to the search index.
#[derive(Debug, Error)]
pub enum IndexError {
    #[error("Search index request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search index returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Unexpected search index response: {0}")]
    Decode(String),

    #[error("Search index unavailable: {0}")]
    Unavailable(String),
}

impl From<sea_orm::DbErr> for TagError {
    fn from(err: sea_orm::DbErr) -> Self {
        TagError::StoreUnavailable(format!("Database error: {}", err))
    }
}

impl From<IndexError> for TagError {
    fn from(err: IndexError) -> Self {
        TagError::SearchBackendUnavailable(err.to_string())
    }
}

/// Convert TagError to AppError for standardized error responses
impl From<TagError> for AppError {
    fn from(err: TagError) -> Self {
        match err {
            TagError::InvalidArgument(msg) => AppError::BadRequest(msg),
            TagError::NotFound(id) => AppError::NotFound(format!("Tag {} not found", id)),
            TagError::StoreUnavailable(message) => AppError::Dependency {
                code: ErrorCode::StoreUnavailable,
                message,
            },
            TagError::SearchBackendUnavailable(message) => AppError::Dependency {
                code: ErrorCode::SearchUnavailable,
                message,
            },
            TagError::InternalInconsistency(msg) => AppError::InternalServerError(msg),
        }
    }
}

impl IntoResponse for TagError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}
