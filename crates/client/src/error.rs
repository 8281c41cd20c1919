//! Client error types.
//!
//! Failures are categorized only by how the request ended: the network
//! failed, the backend answered with a non-success status, or no session was
//! available. Nothing is retried automatically; transient and permanent
//! failures are reported the same way.

use std::sync::Arc;

use reqwest::StatusCode;
use thiserror::Error;

use crate::admin::FormError;
use crate::session::SessionError;

/// Errors that can occur when talking to the Tryla backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body was not the expected JSON.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Backend answered with a non-success status.
    #[error("{message} (HTTP {status})")]
    Status {
        /// HTTP status code.
        status: StatusCode,
        /// Message from the JSON body, or a generic fallback.
        message: String,
    },

    /// Backend rejected the bearer token; the session has been cleared.
    #[error("Session expired")]
    Unauthorized,

    /// Operation needs a session and none is stored.
    #[error("Not logged in")]
    NotAuthenticated,

    /// Resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// Input rejected locally; no request was sent.
    #[error("Invalid input: {0}")]
    Validation(#[from] ValidationError),

    /// Admin form action not allowed in its current state.
    #[error("Form error: {0}")]
    Form(#[from] FormError),

    /// Reading or writing the stored session failed.
    #[error("Session storage error: {0}")]
    Session(#[from] SessionError),

    /// The owning request scope was cancelled before the response arrived.
    #[error("Request cancelled")]
    Cancelled,

    /// Invalid base URL or endpoint path.
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// Response was well-formed JSON but not the expected shape.
    #[error("Unexpected response: {0}")]
    UnexpectedResponse(String),

    /// Failure shared by several callers of one coalesced request.
    #[error(transparent)]
    Shared(Arc<ApiError>),
}

impl ApiError {
    /// Whether the backend rejected the session token.
    #[must_use]
    pub fn is_unauthorized(&self) -> bool {
        match self {
            Self::Unauthorized => true,
            Self::Shared(inner) => inner.is_unauthorized(),
            _ => false,
        }
    }

    /// HTTP status of the failure, if the backend answered.
    #[must_use]
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::Status { status, .. } => Some(*status),
            Self::Unauthorized => Some(StatusCode::UNAUTHORIZED),
            Self::NotFound(_) => Some(StatusCode::NOT_FOUND),
            Self::Http(err) => err.status(),
            Self::Shared(inner) => inner.status(),
            _ => None,
        }
    }

    /// Text suitable for a toast or inline form message.
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { message, .. } | Self::NotFound(message) => message.clone(),
            Self::Http(_) => "Network error, please try again".to_string(),
            Self::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            Self::NotAuthenticated => "Please log in to continue".to_string(),
            Self::Validation(err) => err.to_string(),
            Self::Form(err) => err.to_string(),
            Self::Shared(inner) => inner.user_message(),
            _ => "Something went wrong".to_string(),
        }
    }
}

impl From<Arc<Self>> for ApiError {
    fn from(err: Arc<Self>) -> Self {
        Self::Shared(err)
    }
}

/// Input rejected before any request is sent.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A size must be chosen before adding to the cart.
    #[error("Please select a size")]
    EmptySize,

    /// Cart quantities start at one.
    #[error("Quantity must be at least 1")]
    ZeroQuantity,

    /// A required form field was left blank.
    #[error("{0} is required")]
    MissingField(&'static str),

    /// A numeric form field did not parse.
    #[error("{field} must be a number (got {value:?})")]
    NotANumber {
        /// Field label.
        field: &'static str,
        /// Raw input.
        value: String,
    },

    /// Email field did not look like an address.
    #[error("Invalid email address: {0}")]
    Email(#[from] tryla_core::EmailError),
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_error_display() {
        let err = ApiError::Status {
            status: StatusCode::BAD_REQUEST,
            message: "Out of stock".to_string(),
        };
        assert_eq!(err.to_string(), "Out of stock (HTTP 400 Bad Request)");
        assert_eq!(err.user_message(), "Out of stock");
    }

    #[test]
    fn test_shared_error_is_transparent() {
        let err = ApiError::Shared(Arc::new(ApiError::Unauthorized));
        assert!(err.is_unauthorized());
        assert_eq!(err.to_string(), "Session expired");
        assert_eq!(err.status(), Some(StatusCode::UNAUTHORIZED));
    }

    #[test]
    fn test_validation_messages() {
        assert_eq!(
            ApiError::from(ValidationError::EmptySize).user_message(),
            "Please select a size"
        );
        let err = ValidationError::NotANumber {
            field: "Price",
            value: "abc".to_string(),
        };
        assert_eq!(err.to_string(), "Price must be a number (got \"abc\")");
    }

    #[test]
    fn test_generic_fallback() {
        assert_eq!(ApiError::Cancelled.user_message(), "Something went wrong");
    }
}
