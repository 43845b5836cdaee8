//! Common error types and handling for QuickFix

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::db::{CacheError, RemoteError};
use crate::state::StateError;

/// Common result type
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the chat workspace
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Local cache error: {0}")]
    Cache(#[from] CacheError),

    #[error("Remote store error: {0}")]
    Remote(#[from] RemoteError),

    #[error("{0}")]
    InvalidTransition(#[from] StateError),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Get the appropriate HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::NotFound(_) => StatusCode::NOT_FOUND,
            Error::Conflict(_) | Error::InvalidTransition(_) => StatusCode::CONFLICT,
            Error::Remote(RemoteError::Auth(_)) => StatusCode::UNAUTHORIZED,
            Error::Remote(RemoteError::Quota(_)) => StatusCode::TOO_MANY_REQUESTS,
            Error::Remote(_) => StatusCode::BAD_GATEWAY,
            Error::Cache(_) | Error::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get the error code for API responses
    pub fn error_code(&self) -> &'static str {
        match self {
            Error::Cache(_) => "CACHE_ERROR",
            Error::Remote(_) => "REMOTE_ERROR",
            Error::InvalidTransition(_) => "INVALID_TRANSITION",
            Error::Validation(_) => "VALIDATION_ERROR",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Conflict(_) => "CONFLICT",
            Error::Internal(_) => "INTERNAL_ERROR",
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let error_code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error = %self, code = error_code, "Request failed");
        }

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": self.to_string(),
            }
        }));

        (status, body).into_response()
    }
}
