//! Dispatch error types.

use thiserror::Error;

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, HttpClientError>;

/// Errors produced while dispatching a request.
#[derive(Debug, Error)]
pub enum HttpClientError {
    /// An interceptor rejected the request. Never retried.
    #[error("Interceptor error: {0}")]
    Interceptor(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Non-2xx response promoted to an error by
    /// [`error_for_status`](crate::Response::error_for_status).
    #[error("Response error: {status} - {message}")]
    Response {
        /// HTTP status code.
        status: u16,
        /// Response body, or a placeholder when unreadable.
        message: String,
    },

    /// Body that failed to decode as text or JSON.
    #[error("JSON error: {0}")]
    Json(String),

    /// Transport-level failure from the underlying client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The request URL did not parse.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl HttpClientError {
    /// Wrap an interceptor failure, preserving it as the error source.
    pub fn interceptor(error: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Interceptor(Box::new(error))
    }

    /// The HTTP status behind this error, when one was received.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::Response { status, .. } => Some(*status),
            Self::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
