//! HTTP client implementation.

use std::sync::Arc;

use http::Method;
use reqwest::Request;
use tracing::debug;

use crate::{HttpClientConfig, RequestInterceptor, Response, Result};

/// HTTP client with an ordered request-interceptor chain and bounded retry.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
    config: Arc<HttpClientConfig>,
    interceptors: Vec<Arc<dyn RequestInterceptor>>,
}

impl HttpClient {
    /// Build a client from the configuration.
    pub fn new(config: HttpClientConfig) -> Self {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .build()
            .expect("Failed to build HTTP client");

        Self {
            inner,
            config: Arc::new(config),
            interceptors: Vec::new(),
        }
    }

    /// A client with default configuration.
    pub fn default_client() -> Self {
        Self::new(HttpClientConfig::default())
    }

    /// Append an interceptor to the end of the chain.
    pub fn with_interceptor(mut self, interceptor: impl RequestInterceptor + 'static) -> Self {
        self.interceptors.push(Arc::new(interceptor));
        self
    }

    /// The underlying reqwest client, for requests that bypass dispatch.
    pub fn inner(&self) -> &reqwest::Client {
        &self.inner
    }

    /// The configuration this client was built from.
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Build a bare request for [`execute`](Self::execute).
    pub fn request(&self, method: Method, url: impl AsRef<str>) -> Result<Request> {
        let url = url.as_ref().parse::<url::Url>()?;
        Ok(Request::new(method, url))
    }

    /// Run the interceptor chain, then dispatch with bounded retry.
    ///
    /// The first interceptor failure aborts the dispatch; nothing is sent and
    /// nothing is retried. Transport-level failures are retried up to the
    /// configured attempt bound with a fresh clone of the request. A received
    /// response of any status, 2xx or not, ends the attempts and is returned
    /// for the caller to interpret.
    pub async fn execute(&self, mut request: Request) -> Result<Response> {
        for interceptor in &self.interceptors {
            request = interceptor.intercept(request).await?;
        }

        let attempts = self.config.retries.max(1);
        let mut attempt = 1;

        loop {
            let attempt_request = match request.try_clone() {
                Some(clone) => clone,
                // Streaming bodies cannot be replayed; send the original once.
                None => return self.execute_once(request).await,
            };

            match self.execute_once(attempt_request).await {
                Ok(response) => return Ok(response),
                Err(e) if attempt < attempts => {
                    debug!(attempt, error = %e, "Retrying request after transport error");
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }

    /// One network attempt, no retry accounting.
    async fn execute_once(&self, request: Request) -> Result<Response> {
        let response = self.inner.execute(request).await?;
        Ok(Response::from_reqwest(response).await)
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::default_client()
    }
}
