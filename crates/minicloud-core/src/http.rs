//! HTTP rendering of [`AppError`].
//!
//! Lives next to the error type so handlers in any crate can return
//! `Result<_, AppError>` directly.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use crate::error::{AppError, ErrorKind};

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
}

impl ErrorKind {
    /// HTTP status for this kind of error.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::InvalidInput | Self::Conflict | Self::NotEmpty | Self::InvalidOperation => {
                StatusCode::BAD_REQUEST
            }
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::RateLimited => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.kind.status_code();

        let message = if self.kind == ErrorKind::Internal {
            tracing::error!(error = %self, source = ?self.source, "Internal server error");
            "An internal error occurred".to_string()
        } else {
            self.message.clone()
        };

        let body = ApiErrorResponse {
            error: self.kind.code().to_string(),
            message,
        };

        (status, Json(body)).into_response()
    }
}
