//! Error types for the Bilibili API client.
//!
//! [`BiliError`] is `Clone`: one failed session-metadata refresh is handed to
//! every caller that was waiting on it, so sources that are not themselves
//! clonable (`reqwest::Error`, `serde_json::Error`, `std::io::Error`) are
//! held behind an [`Arc`].

use std::sync::Arc;
use thiserror::Error;

/// API code returned when the request needs a logged-in session.
pub const CODE_NOT_LOGGED_IN: i64 = -101;

/// Errors that can occur when interacting with the Bilibili API.
#[derive(Debug, Clone, Error)]
pub enum BiliError {
    /// HTTP transport error (connection refused, timeout, TLS, proxy, etc.).
    #[error("HTTP request failed: {0}")]
    Http(Arc<reqwest::Error>),

    /// The server answered with a non-2xx HTTP status.
    #[error("HTTP status {0}")]
    Status(u16),

    /// Failed to parse the JSON response body.
    #[error("JSON error: {0}")]
    Json(Arc<serde_json::Error>),

    /// The JSON decoded but a required field was absent or empty.
    #[error("missing field in response: {0}")]
    MissingField(&'static str),

    /// The API returned a non-zero `code` in its JSON envelope.
    ///
    /// Common codes:
    /// - `-101`: not logged in
    /// - `-111`: CSRF check failed
    /// - `-352` / `-412`: risk control (request rejected)
    #[error("API error (code {code}): {message}")]
    Api {
        /// Bilibili API status code (not HTTP status).
        code: i64,
        /// Human-readable `message` from the envelope.
        message: String,
    },

    /// No cookie with the given name is present in the store.
    #[error("cookie not found: {0}")]
    CookieNotFound(String),

    /// File I/O error (session or config read/write).
    #[error("I/O error: {0}")]
    Io(Arc<std::io::Error>),

    /// Catch-all for other errors (e.g. missing config directory).
    #[error("{0}")]
    Other(String),
}

impl BiliError {
    /// Whether the server rejected the call because the session is anonymous.
    pub fn is_not_logged_in(&self) -> bool {
        matches!(self, Self::Api { code, .. } if *code == CODE_NOT_LOGGED_IN)
    }
}

impl From<reqwest::Error> for BiliError {
    fn from(e: reqwest::Error) -> Self {
        Self::Http(Arc::new(e))
    }
}

impl From<serde_json::Error> for BiliError {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(Arc::new(e))
    }
}

impl From<std::io::Error> for BiliError {
    fn from(e: std::io::Error) -> Self {
        Self::Io(Arc::new(e))
    }
}

/// Convenience alias for `Result<T, BiliError>`.
pub type Result<T> = std::result::Result<T, BiliError>;
