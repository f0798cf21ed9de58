//! Registry snapshots and the shared handle that swaps them.

use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::instance::Instance;

/// One application and its registered instances.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Application {
    pub name: String,
    #[serde(rename = "instance")]
    pub instances: Vec<Instance>,
}

impl Application {
    /// Instances currently eligible for traffic.
    pub fn up_instances(&self) -> impl Iterator<Item = &Instance> {
        self.instances.iter().filter(|instance| instance.is_up())
    }
}

/// A full registry listing as returned by one fetch.
///
/// Snapshots are immutable once built. Refreshes produce a new snapshot
/// and swap it into the [`SharedRegistry`] wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RegistrySnapshot {
    #[serde(rename = "versions__delta")]
    pub versions_delta: String,
    #[serde(rename = "apps__hashcode")]
    pub apps_hashcode: String,
    #[serde(rename = "application")]
    pub applications: Vec<Application>,
}

impl RegistrySnapshot {
    /// Look up an application by name, ignoring case.
    pub fn application(&self, name: &str) -> Option<&Application> {
        self.applications
            .iter()
            .find(|application| application.name.eq_ignore_ascii_case(name))
    }

    /// Total number of instances across all applications.
    pub fn instance_count(&self) -> usize {
        self.applications
            .iter()
            .map(|application| application.instances.len())
            .sum()
    }
}

/// Shared handle over the latest registry snapshot.
///
/// Readers take a cheap [`Arc`] clone of the current snapshot and keep a
/// consistent view even while a refresh swaps in a newer one.
#[derive(Debug, Clone, Default)]
pub struct SharedRegistry {
    inner: Arc<RwLock<Arc<RegistrySnapshot>>>,
}

impl SharedRegistry {
    /// An empty registry, as before the first fetch completes.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry pre-populated with a snapshot.
    pub fn with_snapshot(snapshot: RegistrySnapshot) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Arc::new(snapshot))),
        }
    }

    /// The current snapshot.
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        self.inner.read().clone()
    }

    /// Swap in a freshly fetched snapshot, replacing the previous one.
    pub(crate) fn replace(&self, snapshot: RegistrySnapshot) {
        *self.inner.write() = Arc::new(snapshot);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instance::InstanceStatus;
    use serde_json::json;

    fn instance(id: &str, status: InstanceStatus) -> Instance {
        serde_json::from_value(json!({
            "instanceId": id,
            "status": status.as_str(),
        }))
        .unwrap()
    }

    fn snapshot_with(name: &str, instances: Vec<Instance>) -> RegistrySnapshot {
        RegistrySnapshot {
            applications: vec![Application {
                name: name.to_string(),
                instances,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_application_lookup_is_case_insensitive() {
        let snapshot = snapshot_with("BILLING", vec![]);

        assert!(snapshot.application("billing").is_some());
        assert!(snapshot.application("Billing").is_some());
        assert!(snapshot.application("BILLING").is_some());
        assert!(snapshot.application("payments").is_none());
    }

    #[test]
    fn test_up_instances_skips_other_statuses() {
        let application = Application {
            name: "BILLING".to_string(),
            instances: vec![
                instance("10.0.0.1:BILLING:80", InstanceStatus::Up),
                instance("10.0.0.2:BILLING:80", InstanceStatus::Down),
                instance("10.0.0.3:BILLING:80", InstanceStatus::Starting),
                instance("10.0.0.4:BILLING:80", InstanceStatus::Up),
            ],
        };

        let up: Vec<_> = application
            .up_instances()
            .map(|instance| instance.instance_id.as_str())
            .collect();
        assert_eq!(up, vec!["10.0.0.1:BILLING:80", "10.0.0.4:BILLING:80"]);
    }

    #[test]
    fn test_replace_swaps_snapshot_wholesale() {
        let registry = SharedRegistry::new();
        assert_eq!(registry.snapshot().instance_count(), 0);

        registry.replace(snapshot_with(
            "ALPHA",
            vec![instance("10.0.0.1:ALPHA:80", InstanceStatus::Up)],
        ));
        let held = registry.snapshot();
        assert!(held.application("alpha").is_some());

        registry.replace(snapshot_with(
            "BETA",
            vec![instance("10.0.0.2:BETA:80", InstanceStatus::Up)],
        ));

        let current = registry.snapshot();
        assert!(current.application("alpha").is_none());
        assert!(current.application("beta").is_some());

        // A reader holding the old snapshot keeps its consistent view.
        assert!(held.application("alpha").is_some());
        assert!(held.application("beta").is_none());
    }

    #[test]
    fn test_snapshot_decodes_registry_listing() {
        let snapshot: RegistrySnapshot = serde_json::from_value(json!({
            "versions__delta": "1",
            "apps__hashcode": "UP_2_",
            "application": [
                {
                    "name": "BILLING",
                    "instance": [
                        {"instanceId": "10.0.0.1:BILLING:8080", "status": "UP"},
                        {"instanceId": "10.0.0.2:BILLING:8080", "status": "DOWN"}
                    ]
                }
            ]
        }))
        .unwrap();

        assert_eq!(snapshot.versions_delta, "1");
        assert_eq!(snapshot.apps_hashcode, "UP_2_");
        assert_eq!(snapshot.instance_count(), 2);

        let billing = snapshot.application("billing").unwrap();
        assert_eq!(billing.up_instances().count(), 1);
    }

    // One sparse peer entry must not fail the whole listing.
    #[test]
    fn test_listing_tolerates_port_without_enabled_flag() {
        let snapshot: RegistrySnapshot = serde_json::from_value(json!({
            "application": [{
                "name": "BILLING",
                "instance": [
                    {"instanceId": "10.0.0.1:BILLING:8080", "status": "UP", "port": {"$": 8080}}
                ]
            }]
        }))
        .unwrap();

        let billing = snapshot.application("billing").unwrap();
        assert_eq!(billing.instances[0].port_value(), 8080);
        assert!(billing.instances[0].port.as_ref().unwrap().is_enabled());
    }
}
