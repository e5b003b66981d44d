//! Error codes raised by the HTTP layer itself.
//!
//! Domain crates carry their own codes (for example `TEAM_EXISTS`) and hand
//! them over through [`AppError::Rejected`](super::AppError::Rejected).

use axum::http::StatusCode;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Body is not valid JSON or does not match the expected shape
    InvalidRequest,
    /// Body or query parsed but failed validation rules
    ValidationError,
    NotFound,
    MethodNotAllowed,
    InternalError,
    ServiceUnavailable,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "INVALID_REQUEST",
            Self::ValidationError => "VALIDATION_ERROR",
            Self::NotFound => "NOT_FOUND",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::InternalError => "INTERNAL_ERROR",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::InvalidRequest | Self::ValidationError => StatusCode::BAD_REQUEST,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED,
            Self::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::InvalidRequest => "Invalid request payload",
            Self::ValidationError => "Request validation failed",
            Self::NotFound => "resource not found",
            Self::MethodNotAllowed => "method not allowed",
            Self::InternalError => "internal server error",
            Self::ServiceUnavailable => "service unavailable",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
