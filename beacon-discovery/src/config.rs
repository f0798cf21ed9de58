//! Discovery client configuration.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

/// Discovery client configuration.
///
/// Defaults are applied at construction: 30 second heartbeats, 15 second
/// registry fetches, a 90 second lease and port 80. The application name is
/// normalized to uppercase, matching how the registry keys applications.
///
/// # Examples
///
/// ```rust
/// use beacon_discovery::ClientConfig;
/// use std::time::Duration;
///
/// let config = ClientConfig::new("http://registry:8761/eureka", "billing")
///     .port(8080)
///     .heartbeat_interval(Duration::from_secs(10))
///     .metadata("zone", "eu-west-1");
///
/// assert_eq!(config.app_name, "BILLING");
/// ```
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the registry, e.g. `http://registry:8761/eureka`.
    pub registry_url: String,
    /// Application name, uppercased.
    pub app_name: String,
    /// Port the local instance serves on.
    pub port: u16,
    /// Explicit instance IP, overriding OS detection.
    pub ip_addr: Option<IpAddr>,
    /// Interval between lease renewals.
    pub heartbeat_interval: Duration,
    /// Interval between registry snapshot fetches.
    pub registry_fetch_interval: Duration,
    /// Lease duration granted to the instance.
    pub lease_duration: Duration,
    /// Free-form instance metadata.
    pub metadata: HashMap<String, String>,
}

impl ClientConfig {
    /// Create a configuration with defaults applied.
    pub fn new(registry_url: impl Into<String>, app_name: impl Into<String>) -> Self {
        Self {
            registry_url: registry_url.into().trim().to_string(),
            app_name: app_name.into().to_uppercase(),
            port: 80,
            ip_addr: None,
            heartbeat_interval: Duration::from_secs(30),
            registry_fetch_interval: Duration::from_secs(15),
            lease_duration: Duration::from_secs(90),
            metadata: HashMap::new(),
        }
    }

    /// Set the instance port. Zero keeps the default.
    pub fn port(mut self, port: u16) -> Self {
        if port != 0 {
            self.port = port;
        }
        self
    }

    /// Pin the instance IP instead of detecting it.
    pub fn ip_addr(mut self, ip: IpAddr) -> Self {
        self.ip_addr = Some(ip);
        self
    }

    /// Set the heartbeat interval. Zero keeps the default.
    pub fn heartbeat_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.heartbeat_interval = interval;
        }
        self
    }

    /// Set the registry fetch interval. Zero keeps the default.
    pub fn registry_fetch_interval(mut self, interval: Duration) -> Self {
        if !interval.is_zero() {
            self.registry_fetch_interval = interval;
        }
        self
    }

    /// Set the lease duration. Zero keeps the default.
    pub fn lease_duration(mut self, duration: Duration) -> Self {
        if !duration.is_zero() {
            self.lease_duration = duration;
        }
        self
    }

    /// Add one metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}
