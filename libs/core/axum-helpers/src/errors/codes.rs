//! Error codes carried in every [`ErrorResponse`](super::ErrorResponse).
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Stable identifiers for API errors.
///
/// Integer ranges:
/// - 1000-1999: client errors
/// - 2000-2999: backing service failures
/// - 5000-5999: server errors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Request body or query failed validation
    ValidationError,
    /// Query string could not be parsed
    InvalidQuery,
    /// JSON body could not be parsed
    JsonExtraction,
    NotFound,
    MethodNotAllowed,

    /// Relational store unreachable, erroring or timed out
    StoreUnavailable,
    /// Search index unreachable or erroring
    SearchUnavailable,

    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::InvalidQuery => "INVALID_QUERY",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::StoreUnavailable => "STORE_UNAVAILABLE",
            Self::SearchUnavailable => "SEARCH_UNAVAILABLE",
            Self::InternalError => "INTERNAL_ERROR",
        }
    }

    /// Integer code used in structured logs.
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::InvalidQuery => 1002,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::MethodNotAllowed => 1005,

            Self::StoreUnavailable => 2001,
            Self::SearchUnavailable => 2002,

            Self::InternalError => 5001,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::InvalidQuery => "Invalid query parameters",
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::MethodNotAllowed => "The HTTP method is not allowed for this resource",
            Self::StoreUnavailable => "The tag store is temporarily unavailable",
            Self::SearchUnavailable => "Tag search is temporarily unavailable",
            Self::InternalError => "An internal server error occurred",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
