//! Unified error handling with Sentry integration.
//!
//! Route handlers return `Result<T, AppError>`. Failures on the backend side
//! are captured to Sentry before responding.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tryla_client::ApiError;

/// Application-level error type for the storefront.
#[derive(Debug, Error)]
pub enum AppError {
    /// Backend request failed.
    #[error("Backend error: {0}")]
    Backend(#[from] ApiError),

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),
}

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Backend(err) => match err.status() {
                Some(StatusCode::NOT_FOUND) => StatusCode::NOT_FOUND,
                Some(status) if status.is_client_error() => status,
                _ => StatusCode::BAD_GATEWAY,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Capture backend failures to Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Request error"
            );
        }

        // Don't expose backend details for server-side failures
        let message = match &self {
            Self::NotFound(message) => message.clone(),
            Self::Backend(err) if status.is_client_error() => err.user_message(),
            Self::Backend(_) => "External service error".to_string(),
        };

        (status, Json(json!({ "message": message }))).into_response()
    }
}

/// Result type alias for `AppError`.
pub type Result<T> = std::result::Result<T, AppError>;
