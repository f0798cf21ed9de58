//! REST transport for registry operations.

use std::time::Duration;

use reqwest::header::ACCEPT;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DiscoveryError;
use crate::instance::{Instance, InstanceStatus};
use crate::registry::RegistrySnapshot;

/// Thin client over the registry's REST interface.
///
/// Every call is a single request. Any 2xx answer counts as success;
/// everything else is surfaced as [`DiscoveryError::Registry`] with the
/// status code and response body.
#[derive(Debug, Clone)]
pub struct RegistryTransport {
    base_url: String,
    client: reqwest::Client,
}

impl RegistryTransport {
    /// Create a transport for the registry at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            base_url: base_url.into(),
            client,
        }
    }

    /// Register an instance under its application.
    pub async fn register(&self, instance: &Instance) -> Result<(), DiscoveryError> {
        let url = join_url(&self.base_url, &format!("apps/{}", instance.app));
        debug!(app = %instance.app, instance_id = %instance.instance_id, "Registering instance");

        let response = self
            .client
            .post(&url)
            .json(&InstanceEnvelope { instance })
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(registry_error(response).await)
        }
    }

    /// Remove an instance from its application.
    pub async fn deregister(&self, app_name: &str, instance_id: &str) -> Result<(), DiscoveryError> {
        let url = join_url(&self.base_url, &format!("apps/{app_name}/{instance_id}"));
        debug!("Deregistering instance {instance_id}");

        let response = self.client.delete(&url).send().await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(registry_error(response).await)
        }
    }

    /// Renew the instance lease, reporting the instance as up.
    pub async fn heartbeat(&self, app_name: &str, instance_id: &str) -> Result<(), DiscoveryError> {
        let url = join_url(&self.base_url, &format!("apps/{app_name}/{instance_id}"));

        let response = self
            .client
            .put(&url)
            .query(&[("status", InstanceStatus::Up.as_str())])
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(registry_error(response).await)
        }
    }

    /// Fetch the full registry listing.
    pub async fn list_applications(&self) -> Result<RegistrySnapshot, DiscoveryError> {
        let url = join_url(&self.base_url, "apps");

        let response = self
            .client
            .get(&url)
            .header(ACCEPT, "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(registry_error(response).await);
        }

        let body = response.bytes().await?;
        let envelope: ApplicationsEnvelope =
            serde_json::from_slice(&body).map_err(DiscoveryError::Decode)?;

        debug!(
            instances = envelope.applications.instance_count(),
            "Fetched registry listing"
        );
        Ok(envelope.applications)
    }
}

/// Request body wrapper expected by the registration endpoint.
#[derive(Serialize)]
struct InstanceEnvelope<'a> {
    instance: &'a Instance,
}

/// Response wrapper around the registry listing.
#[derive(Deserialize)]
struct ApplicationsEnvelope {
    #[serde(default)]
    applications: RegistrySnapshot,
}

async fn registry_error(response: reqwest::Response) -> DiscoveryError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    DiscoveryError::Registry { status, body }
}

/// Join a base URL and a path with exactly one slash between them.
fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim().trim_end_matches('/'),
        path.trim().trim_start_matches('/')
    )
}
