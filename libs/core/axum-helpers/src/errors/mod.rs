pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use utoipa::ToSchema;
use validator::{ValidationErrors, ValidationErrorsKind};

/// Error envelope returned for every non-2xx response.
///
/// ```json
/// { "error": { "code": "PR_EXISTS", "message": "PR already exists" } }
/// ```
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct ErrorBody {
    /// Machine-readable code, e.g. `NOT_FOUND`
    pub code: String,
    pub message: String,
    /// Per-field validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
                details: None,
            },
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.error.details = Some(details);
        self
    }
}

/// Error type every handler returns, directly or through a domain error's
/// `From` impl.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Query extraction error: {0}")]
    QueryExtractorRejection(#[from] QueryRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    /// A domain rule violation with its own wire code.
    #[error("{code}: {message}")]
    Rejected {
        status: StatusCode,
        code: &'static str,
        message: String,
    },

    #[error("Not Found: {0}")]
    NotFound(String),

    /// The detail is logged, never sent to the client.
    #[error("Internal Server Error: {0}")]
    InternalServerError(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    pub fn rejected(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self::Rejected {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::JsonExtractorRejection(_) => ErrorCode::InvalidRequest.status(),
            Self::QueryExtractorRejection(_) | Self::ValidationError(_) => {
                ErrorCode::ValidationError.status()
            }
            Self::Rejected { status, .. } => *status,
            Self::NotFound(_) => ErrorCode::NotFound.status(),
            Self::InternalServerError(_) => ErrorCode::InternalError.status(),
            Self::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable.status(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            AppError::JsonExtractorRejection(e) => {
                tracing::warn!(error = %e.body_text(), "Rejected request body");
                ErrorResponse::new(
                    ErrorCode::InvalidRequest.as_str(),
                    ErrorCode::InvalidRequest.default_message(),
                )
            }
            AppError::QueryExtractorRejection(e) => {
                tracing::warn!(error = %e.body_text(), "Rejected query string");
                ErrorResponse::new(ErrorCode::ValidationError.as_str(), e.body_text())
            }
            AppError::ValidationError(e) => {
                tracing::info!(error = %e, "Validation failed");
                let details = serde_json::to_value(&e).unwrap_or(serde_json::Value::Null);
                ErrorResponse::new(ErrorCode::ValidationError.as_str(), summarize(&e))
                    .with_details(details)
            }
            AppError::Rejected { code, message, .. } => {
                tracing::info!(code, %message, "Request rejected");
                ErrorResponse::new(code, message)
            }
            AppError::NotFound(message) => {
                tracing::info!(%message, "Not found");
                ErrorResponse::new(ErrorCode::NotFound.as_str(), message)
            }
            AppError::InternalServerError(detail) => {
                tracing::error!(%detail, "Internal server error");
                ErrorResponse::new(
                    ErrorCode::InternalError.as_str(),
                    ErrorCode::InternalError.default_message(),
                )
            }
            AppError::ServiceUnavailable(message) => {
                tracing::warn!(%message, "Service unavailable");
                ErrorResponse::new(ErrorCode::ServiceUnavailable.as_str(), message)
            }
        };

        (status, Json(body)).into_response()
    }
}

/// One line per failing field, e.g. `members[1].user_id: must not be blank`.
pub fn summarize(errors: &ValidationErrors) -> String {
    let mut lines = Vec::new();
    collect_messages("", errors, &mut lines);
    lines.sort();
    lines.join("; ")
}

fn collect_messages(prefix: &str, errors: &ValidationErrors, out: &mut Vec<String>) {
    for (field, kind) in errors.errors() {
        let path = match (prefix.is_empty(), field.as_ref()) {
            (true, "__all__") => String::new(),
            (false, "__all__") => prefix.to_string(),
            (true, name) => name.to_string(),
            (false, name) => format!("{prefix}.{name}"),
        };

        match kind {
            ValidationErrorsKind::Field(field_errors) => {
                for err in field_errors {
                    let message = err.message.as_deref().unwrap_or(err.code.as_ref());
                    if path.is_empty() {
                        out.push(message.to_string());
                    } else {
                        out.push(format!("{path}: {message}"));
                    }
                }
            }
            ValidationErrorsKind::Struct(inner) => collect_messages(&path, inner, out),
            ValidationErrorsKind::List(items) => {
                for (index, inner) in items {
                    collect_messages(&format!("{path}[{index}]"), inner, out);
                }
            }
        }
    }
}
