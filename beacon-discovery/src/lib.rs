//! Service discovery client with client-side load balancing.
//!
//! Registers the local service instance with a discovery registry, keeps
//! its lease alive, and mirrors the registry into an in-process snapshot
//! that requests are balanced against.
//!
//! # Features
//!
//! - Instance registration with periodic lease renewal
//! - Background registry refresh with atomically swapped snapshots
//! - Least-used instance selection behind logical host names
//! - Signal-driven graceful deregistration
//!
//! # Quick Start
//!
//! ```no_run
//! use beacon_discovery::{ClientConfig, DiscoveryClient, LoadBalancerInterceptor};
//! use beacon_http_client::{HttpClient, Method};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ClientConfig::new("http://localhost:8761/eureka", "billing").port(8080);
//!     let client = DiscoveryClient::new(config)?;
//!     client.start().await?;
//!     let shutdown = client.shutdown_on_signal();
//!
//!     // Address peers by application name; the interceptor picks an instance.
//!     let http = HttpClient::default_client()
//!         .with_interceptor(LoadBalancerInterceptor::new(client.registry().clone()));
//!     let request = http.request(Method::GET, "http://payments/api/charges")?;
//!     let response = http.execute(request).await?;
//!     println!("payments answered with {}", response.status());
//!
//!     shutdown.await?;
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod instance;
pub mod interceptor;
mod net;
pub mod registry;
pub mod transport;

pub use client::{ClientState, DiscoveryClient};
pub use config::ClientConfig;
pub use error::DiscoveryError;
pub use instance::{DataCenterInfo, DataCenterMetadata, Instance, InstanceStatus, LeaseInfo, Port};
pub use interceptor::LoadBalancerInterceptor;
pub use registry::{Application, RegistrySnapshot, SharedRegistry};
pub use transport::RegistryTransport;
