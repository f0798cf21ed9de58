//! Request interceptors.

use crate::Result;
use async_trait::async_trait;
use reqwest::Request;

/// Interceptor applied to every request before it is dispatched.
///
/// Interceptors run in registration order and may rewrite the request.
/// Returning an error aborts the dispatch immediately; the request is
/// never sent and never retried.
#[async_trait]
pub trait RequestInterceptor: Send + Sync {
    /// Intercept and optionally modify the request.
    async fn intercept(&self, request: Request) -> Result<Request>;
}

/// Interceptor that logs every outgoing request line at debug level.
pub struct LoggingInterceptor {
    log_headers: bool,
}

impl LoggingInterceptor {
    /// Log request lines only.
    pub fn new() -> Self {
        Self { log_headers: false }
    }

    /// Also log each request header at trace level.
    pub fn with_headers(mut self) -> Self {
        self.log_headers = true;
        self
    }
}

impl Default for LoggingInterceptor {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RequestInterceptor for LoggingInterceptor {
    async fn intercept(&self, request: Request) -> Result<Request> {
        tracing::debug!(
            method = %request.method(),
            url = %request.url(),
            "Sending HTTP request"
        );

        if self.log_headers {
            for (name, value) in request.headers() {
                tracing::trace!(
                    header = %name,
                    value = ?value,
                    "Request header"
                );
            }
        }

        Ok(request)
    }
}
