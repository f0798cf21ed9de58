//! Discovery error types.

use thiserror::Error;

/// Service discovery errors.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Connection-level failure talking to the registry.
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The registry answered outside the 2xx range.
    #[error("Registry error: {status} {body}")]
    Registry {
        /// HTTP status code returned by the registry.
        status: u16,
        /// Raw response body.
        body: String,
    },

    /// The registry answered 2xx with a payload that does not decode.
    #[error("Decode error: {0}")]
    Decode(#[source] serde_json::Error),

    /// No application with the requested name in the current snapshot.
    #[error("Application not found: {0}")]
    ApplicationNotFound(String),

    /// The application exists but has no instance eligible for traffic.
    #[error("No live instance for application: {0}")]
    NoLiveInstance(String),

    /// The local IP address could not be determined.
    #[error("Failed to detect a local IP address: {0}")]
    LocalIp(#[from] std::io::Error),

    /// The client was shut down and cannot be started again.
    #[error("Discovery client is shut down")]
    ShutDown,
}

/// Resolution failures travel through the dispatch layer as interceptor
/// errors, with the original error preserved as the source.
impl From<DiscoveryError> for beacon_http_client::HttpClientError {
    fn from(error: DiscoveryError) -> Self {
        beacon_http_client::HttpClientError::interceptor(error)
    }
}
