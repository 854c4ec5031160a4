//! Error handling module
//!
//! Centralized error types and HTTP response conversion. Every failure leaves
//! the service as a JSON body of the form `{"errors": "<message>"}`.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::auth::AuthError;
use crate::domain::DomainError;

/// Application-wide Result type
pub type AppResult<T> = Result<T, AppError>;

const INTERNAL_MESSAGE: &str = "internal server error";

/// Application error types
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Client errors (4xx)
    #[error("{0}")]
    InvalidRequest(String),

    #[error("{0}")]
    Unauthenticated(String),

    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub errors: String,
}

impl AppError {
    /// HTTP status for this error
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            AppError::Domain(e) if e.is_client_error() => StatusCode::BAD_REQUEST,
            AppError::Auth(e) if e.is_client_error() => StatusCode::UNAUTHORIZED,
            AppError::Domain(_) | AppError::Auth(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let message = if status.is_server_error() {
            tracing::error!(error = ?self, "Request failed");
            INTERNAL_MESSAGE.to_string()
        } else {
            tracing::debug!(status = %status, error = %self, "Request rejected");
            self.to_string()
        };

        (status, Json(ErrorResponse { errors: message })).into_response()
    }
}
