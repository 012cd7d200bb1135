use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

/// Failure taxonomy for the identity workflow. The first failure in a
/// handler wins; nothing is committed before it.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Missing or malformed client input.
    #[error("{0}")]
    Validation(&'static str),
    /// Bad credentials or a bad, expired or mismatched token. All token
    /// verification failures collapse into this one outcome so the response
    /// does not reveal which check tripped.
    #[error("{0}")]
    Unauthorized(&'static str),
    /// Persistence layer failure, including unique-constraint violations.
    #[error("database error")]
    Storage(#[from] sqlx::Error),
    /// The mail delivery channel reported a failure.
    #[error("email delivery failed")]
    Notification(anyhow::Error),
    /// Hashing, signing or other infrastructure failure.
    #[error("internal error")]
    Internal(anyhow::Error),
}

impl From<anyhow::Error> for ApiError {
    fn from(inner: anyhow::Error) -> Self {
        ApiError::Internal(inner)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        // Full detail stays in the server log; the client only sees the
        // error class and a short message.
        let (status, message) = match &self {
            ApiError::Validation(msg) => {
                warn!(error = *msg, "request validation failed");
                (StatusCode::BAD_REQUEST, *msg)
            }
            ApiError::Unauthorized(msg) => {
                warn!(error = *msg, "unauthorized");
                (StatusCode::UNAUTHORIZED, *msg)
            }
            ApiError::Storage(e) => {
                error!(error = %e, "database error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error")
            }
            ApiError::Notification(e) => {
                error!(error = ?e, "email delivery failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Email error")
            }
            ApiError::Internal(e) => {
                error!(error = ?e, "internal error");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}
