//! Client-side load balancing over registry snapshots.

use std::collections::HashMap;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::debug;

use beacon_http_client::{HttpClientError, Request, RequestInterceptor};

use crate::error::DiscoveryError;
use crate::instance::Instance;
use crate::registry::{Application, SharedRegistry};

/// Interceptor that resolves logical application hosts to live instances.
///
/// Requests are addressed to the application name as if it were a host,
/// for example `http://billing/api/invoices`. The interceptor looks the
/// name up in the current registry snapshot, picks the least-used `UP`
/// instance, and rewrites the URL's host and port to point at it. Path,
/// query and headers pass through untouched.
///
/// An instance that has never been picked wins immediately over any
/// instance that has, so fresh instances receive traffic as soon as they
/// appear in a snapshot.
pub struct LoadBalancerInterceptor {
    registry: SharedRegistry,
    usage: Mutex<HashMap<String, u64>>,
}

impl LoadBalancerInterceptor {
    /// Create an interceptor reading from `registry`.
    pub fn new(registry: SharedRegistry) -> Self {
        Self {
            registry,
            usage: Mutex::new(HashMap::new()),
        }
    }

    /// The registry handle this interceptor resolves against.
    pub fn registry(&self) -> &SharedRegistry {
        &self.registry
    }

    /// How many times an instance has been picked.
    pub fn usage_count(&self, instance_id: &str) -> u64 {
        self.usage.lock().get(instance_id).copied().unwrap_or(0)
    }

    fn select<'a>(&self, application: &'a Application) -> Option<&'a Instance> {
        let mut usage = self.usage.lock();
        let mut chosen: Option<(&'a Instance, u64)> = None;

        for candidate in application.up_instances() {
            match usage.get(&candidate.instance_id) {
                // Never picked before: route to it right away.
                None => {
                    usage.insert(candidate.instance_id.clone(), 1);
                    return Some(candidate);
                }
                Some(&count) => {
                    if chosen.is_none_or(|(_, lowest)| count < lowest) {
                        chosen = Some((candidate, count));
                    }
                }
            }
        }

        chosen.map(|(instance, count)| {
            usage.insert(instance.instance_id.clone(), count + 1);
            instance
        })
    }
}

#[async_trait]
impl RequestInterceptor for LoadBalancerInterceptor {
    async fn intercept(&self, mut request: Request) -> beacon_http_client::Result<Request> {
        let app_name = request.url().host_str().unwrap_or_default().to_string();
        let snapshot = self.registry.snapshot();

        let application = snapshot
            .application(&app_name)
            .ok_or_else(|| DiscoveryError::ApplicationNotFound(app_name.clone()))?;
        let instance = self
            .select(application)
            .ok_or_else(|| DiscoveryError::NoLiveInstance(app_name.clone()))?;

        let url = request.url_mut();
        url.set_host(Some(&instance.host_name))
            .map_err(HttpClientError::UrlParse)?;
        let _ = url.set_port(Some(instance.port_value()));

        debug!(
            app = %application.name,
            instance_id = %instance.instance_id,
            "Routed request to instance"
        );
        Ok(request)
    }
}
