//! Dispatch configuration.

use std::time::Duration;

/// Configuration for an [`HttpClient`](crate::HttpClient).
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// How long one dispatch attempt may take end to end.
    pub timeout: Duration,
    /// Deadline for establishing a connection.
    pub connect_timeout: Duration,
    /// `User-Agent` sent with every request.
    pub user_agent: String,
    /// Upper bound on dispatch attempts per request.
    ///
    /// Values of one or less mean a single attempt. Only transport-level
    /// failures consume extra attempts; any received response ends them.
    pub retries: u32,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            user_agent: format!("beacon-http-client/{}", env!("CARGO_PKG_VERSION")),
            retries: 1,
        }
    }
}

impl HttpClientConfig {
    /// Start building a configuration from the defaults.
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builds an [`HttpClientConfig`] field by field.
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Per-attempt request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Connection establishment deadline.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// `User-Agent` header value.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Dispatch attempt bound, one or less meaning a single attempt.
    pub fn retries(mut self, retries: u32) -> Self {
        self.config.retries = retries;
        self
    }

    /// Finish and return the configuration.
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}
