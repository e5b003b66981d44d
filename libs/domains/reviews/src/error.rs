use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use sea_orm::DbErr;
use thiserror::Error;

/// Every failure a reviewer-assignment operation can report.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ReviewError {
    #[error("team '{0}' already exists")]
    TeamExists(String),

    #[error("user '{0}' already exists")]
    UserExists(String),

    #[error("pull request '{0}' already exists")]
    PrExists(String),

    #[error("pull request '{0}' is already merged")]
    PrMerged(String),

    #[error("user '{user_id}' is not a reviewer of '{pull_request_id}'")]
    NotAssigned {
        pull_request_id: String,
        user_id: String,
    },

    #[error("no active replacement candidate for '{0}'")]
    NoCandidate(String),

    #[error("{0} not found")]
    NotFound(String),

    #[error("invalid input: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

pub type ReviewResult<T> = Result<T, ReviewError>;

impl ReviewError {
    /// Wire code used in the error envelope.
    pub fn code(&self) -> &'static str {
        match self {
            ReviewError::TeamExists(_) => "TEAM_EXISTS",
            ReviewError::UserExists(_) => "USER_EXISTS",
            ReviewError::PrExists(_) => "PR_EXISTS",
            ReviewError::PrMerged(_) => "PR_MERGED",
            ReviewError::NotAssigned { .. } => "NOT_ASSIGNED",
            ReviewError::NoCandidate(_) => "NO_CANDIDATE",
            ReviewError::NotFound(_) => "NOT_FOUND",
            ReviewError::Validation(_) => "VALIDATION_ERROR",
            ReviewError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Client-facing message. Identifiers stay in logs only.
    pub fn message(&self) -> String {
        match self {
            ReviewError::TeamExists(_) => "team already exists".into(),
            ReviewError::UserExists(_) => "user already exists".into(),
            ReviewError::PrExists(_) => "PR already exists".into(),
            ReviewError::PrMerged(_) => "PR is already merged".into(),
            ReviewError::NotAssigned { .. } => "item is not assigned".into(),
            ReviewError::NoCandidate(_) => "no candidate found".into(),
            ReviewError::NotFound(_) => "resource not found".into(),
            ReviewError::Validation(msg) => msg.clone(),
            ReviewError::Internal(_) => "internal server error".into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ReviewError::TeamExists(_) | ReviewError::Validation(_) => StatusCode::BAD_REQUEST,
            ReviewError::NotFound(_) => StatusCode::NOT_FOUND,
            ReviewError::UserExists(_)
            | ReviewError::PrExists(_)
            | ReviewError::PrMerged(_)
            | ReviewError::NotAssigned { .. }
            | ReviewError::NoCandidate(_) => StatusCode::CONFLICT,
            ReviewError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub(crate) fn team_not_found(team_name: &str) -> Self {
        ReviewError::NotFound(format!("team '{team_name}'"))
    }

    pub(crate) fn user_not_found(user_id: &str) -> Self {
        ReviewError::NotFound(format!("user '{user_id}'"))
    }

    pub(crate) fn pull_request_not_found(pull_request_id: &str) -> Self {
        ReviewError::NotFound(format!("pull request '{pull_request_id}'"))
    }
}

impl From<DbErr> for ReviewError {
    fn from(err: DbErr) -> Self {
        ReviewError::Internal(err.to_string())
    }
}

impl From<ReviewError> for AppError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::Internal(detail) => AppError::InternalServerError(detail),
            other => {
                let status = other.status();
                let code = other.code();
                if status.is_client_error() {
                    tracing::info!(code, error = %other, "Review operation rejected");
                }
                AppError::rejected(status, code, other.message())
            }
        }
    }
}

impl IntoResponse for ReviewError {
    fn into_response(self) -> Response {
        let app_error: AppError = self.into();
        app_error.into_response()
    }
}
