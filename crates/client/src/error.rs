//! Error types for the Bazaryo REST client.

use serde::Deserialize;
use thiserror::Error;

/// Errors that can occur when talking to the Bazaryo backend.
#[derive(Debug, Error)]
pub enum ApiError {
    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// An endpoint URL could not be built from the base URL.
    #[error("invalid endpoint URL: {0}")]
    InvalidUrl(String),

    /// The operation needs a signed-in user and no token is set.
    #[error("not signed in")]
    NoToken,

    /// Rate limited by the backend.
    #[error("rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// The token was missing, expired or rejected.
    #[error("unauthorized: {}", .0.as_deref().unwrap_or("token rejected"))]
    Unauthorized(Option<String>),

    /// The requested document does not exist.
    #[error("not found: {}", .0.as_deref().unwrap_or("no such resource"))]
    NotFound(Option<String>),

    /// The backend refused the request.
    #[error("request rejected ({status}): {}", .message.as_deref().unwrap_or("no message"))]
    Rejected {
        /// HTTP status code.
        status: u16,
        /// The `message` field of the error body, if any.
        message: Option<String>,
    },

    /// The response body did not match the expected shape.
    #[error("parse error: {0}")]
    Parse(String),
}

impl ApiError {
    /// The human-readable message the backend attached, if any.
    #[must_use]
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Unauthorized(message) | Self::NotFound(message) => message.as_deref(),
            Self::Rejected { message, .. } => message.as_deref(),
            _ => None,
        }
    }

    /// The backend's message, or `fallback` when it sent none.
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        self.server_message()
            .filter(|message| !message.trim().is_empty())
            .unwrap_or(fallback)
            .to_string()
    }

    /// Whether signing in again could fix this error.
    #[must_use]
    pub const fn is_auth(&self) -> bool {
        matches!(self, Self::NoToken | Self::Unauthorized(_))
    }
}

/// Error body returned by the backend.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

impl ErrorBody {
    /// Extract `message` from a raw body. Non-JSON bodies yield `None`.
    pub(crate) fn message_from(body: &str) -> Option<String> {
        serde_json::from_str::<Self>(body)
            .ok()
            .and_then(|body| body.message)
            .filter(|message| !message.is_empty())
    }
}
