//! # Beacon HTTP Client
//!
//! An HTTP client with an ordered request-interceptor chain and bounded
//! retry of transport failures. It is the dispatch layer underneath
//! `beacon-discovery`'s client-side load balancing, and usable on its own.
//!
//! ## Features
//!
//! - **Interceptors**: Ordered request transformation (service resolution,
//!   logging, headers); the first failure aborts the dispatch
//! - **Bounded Retry**: Transport-level failures retried immediately up to a
//!   configured attempt count; any received response ends the attempts
//! - **Buffered Responses**: Status, headers and body captured up front with
//!   JSON and text accessors
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use beacon_http_client::{HttpClient, HttpClientConfig, Method};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = HttpClient::new(HttpClientConfig::default());
//!
//!     let request = client.request(Method::GET, "https://api.example.com/users")?;
//!     let response = client.execute(request).await?;
//!
//!     println!("Status: {}", response.status());
//!     Ok(())
//! }
//! ```
//!
//! ## With Interceptors and Retry
//!
//! ```rust,no_run
//! use beacon_http_client::{HttpClient, HttpClientConfig, LoggingInterceptor, Method};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = HttpClientConfig::builder()
//!         .timeout(Duration::from_secs(30))
//!         .retries(3)
//!         .build();
//!
//!     let client = HttpClient::new(config)
//!         .with_interceptor(LoggingInterceptor::new().with_headers());
//!
//!     // Transport failures are retried with a fresh clone of the request
//!     let request = client.request(Method::GET, "https://api.example.com/orders")?;
//!     let response = client.execute(request).await?;
//!     let orders: serde_json::Value = response.json()?;
//!
//!     println!("{orders}");
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod interceptor;
mod response;

pub use client::HttpClient;
pub use config::{HttpClientConfig, HttpClientConfigBuilder};
pub use error::{HttpClientError, Result};
pub use interceptor::{LoggingInterceptor, RequestInterceptor};
pub use response::Response;

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use reqwest::Request;
pub use url::Url;

/// Prelude for common imports.
///
/// ```
/// use beacon_http_client::prelude::*;
/// ```
pub mod prelude {
    pub use crate::client::HttpClient;
    pub use crate::config::{HttpClientConfig, HttpClientConfigBuilder};
    pub use crate::error::{HttpClientError, Result};
    pub use crate::interceptor::{LoggingInterceptor, RequestInterceptor};
    pub use crate::response::Response;
    pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
}
