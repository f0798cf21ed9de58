//! Registry instance payloads.
//!
//! Field naming follows the registry's JSON conventions: camelCase keys,
//! `$`/`@enabled` for ports, kebab-case datacenter metadata. Decoding is
//! tolerant of missing fields except for the instance identity.

use std::collections::HashMap;
use std::fmt;
use std::net::IpAddr;

use serde::{Deserialize, Serialize};

use crate::config::ClientConfig;

/// Lifecycle status reported for an instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InstanceStatus {
    /// Eligible for traffic.
    Up,
    /// Known to be down.
    Down,
    /// Starting up, not yet serving.
    Starting,
    /// Administratively removed from rotation.
    OutOfService,
    /// Unreported, or a value this client does not recognize.
    #[default]
    #[serde(other)]
    Unknown,
}

impl InstanceStatus {
    /// Wire representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Up => "UP",
            Self::Down => "DOWN",
            Self::Starting => "STARTING",
            Self::OutOfService => "OUT_OF_SERVICE",
            Self::Unknown => "UNKNOWN",
        }
    }
}

impl fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Port number with the registry's enabled flag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// Port number, serialized under the registry's `$` key.
    #[serde(rename = "$")]
    pub value: u16,
    /// Enabled flag, kept as the wire's `"true"`/`"false"` string.
    /// Absent on some payloads, which counts as enabled.
    #[serde(rename = "@enabled", default = "default_enabled")]
    pub enabled: String,
}

fn default_enabled() -> String {
    "true".to_string()
}

impl Port {
    /// An enabled port.
    pub fn new(value: u16) -> Self {
        Self {
            value,
            enabled: "true".to_string(),
        }
    }

    /// Whether the port is marked enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled == "true"
    }
}

/// Lease contract between the instance and the registry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LeaseInfo {
    /// Seconds between renewals.
    pub renewal_interval_in_secs: u32,
    /// Seconds the lease stays valid without a renewal.
    pub duration_in_secs: u32,
}

/// Datacenter descriptor attached to every instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataCenterInfo {
    pub name: String,
    #[serde(rename = "@class")]
    pub class: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<DataCenterMetadata>,
}

impl DataCenterInfo {
    /// The self-hosted datacenter descriptor used for local instances.
    pub fn own() -> Self {
        Self {
            name: "MyOwn".to_string(),
            class: "com.netflix.appinfo.InstanceInfo$DefaultDataCenterInfo".to_string(),
            metadata: None,
        }
    }
}

/// Cloud-shaped datacenter metadata, all fields optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", default)]
pub struct DataCenterMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ami_launch_index: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub availability_zone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_ipv4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public_hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ami_manifest_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub local_ipv4: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ami_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance_type: Option<String>,
}

/// A single service instance as the registry sees it.
///
/// Built once per client from the local IP and configuration, and decoded
/// from registry listings for every other instance. `instance_id` is the
/// only field required when decoding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    /// Unique instance identity, `{ip}:{app}:{port}`.
    pub instance_id: String,
    #[serde(default)]
    pub host_name: String,
    #[serde(default)]
    pub app: String,
    #[serde(default)]
    pub ip_addr: String,
    #[serde(default)]
    pub status: InstanceStatus,
    /// Status forced by the registry out-of-band, if any.
    #[serde(rename = "overriddenstatus", skip_serializing_if = "Option::is_none")]
    pub overridden_status: Option<InstanceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub vip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure_vip_address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<Port>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secure_port: Option<Port>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub home_page_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_page_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub health_check_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_center_info: Option<DataCenterInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease_info: Option<LeaseInfo>,
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub metadata: HashMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_coordinating_discovery_server: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_updated_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_dirty_timestamp: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub country_id: Option<u32>,
}

impl Instance {
    /// Build the local instance as it will be registered.
    pub fn new(ip: IpAddr, config: &ClientConfig) -> Self {
        let instance_id = format!("{}:{}:{}", ip, config.app_name, config.port);
        let base_url = format!("http://{}:{}", ip, config.port);

        Self {
            instance_id,
            host_name: ip.to_string(),
            app: config.app_name.clone(),
            ip_addr: ip.to_string(),
            status: InstanceStatus::Up,
            overridden_status: Some(InstanceStatus::Unknown),
            vip_address: Some(config.app_name.clone()),
            secure_vip_address: Some(config.app_name.clone()),
            port: Some(Port::new(config.port)),
            secure_port: None,
            home_page_url: Some(base_url.clone()),
            status_page_url: Some(format!("{base_url}/info")),
            health_check_url: None,
            data_center_info: Some(DataCenterInfo::own()),
            lease_info: Some(LeaseInfo {
                renewal_interval_in_secs: config.heartbeat_interval.as_secs() as u32,
                duration_in_secs: config.lease_duration.as_secs() as u32,
            }),
            metadata: config.metadata.clone(),
            is_coordinating_discovery_server: None,
            last_updated_timestamp: None,
            last_dirty_timestamp: None,
            action_type: None,
            country_id: None,
        }
    }

    /// Whether the instance is eligible for traffic.
    pub fn is_up(&self) -> bool {
        self.status == InstanceStatus::Up
    }

    /// Port the instance serves on, falling back to 80.
    pub fn port_value(&self) -> u16 {
        self.port.as_ref().map(|p| p.value).unwrap_or(80)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn config() -> ClientConfig {
        ClientConfig::new("http://localhost:8761/eureka", "billing")
            .port(8080)
            .metadata("zone", "eu-west-1")
    }

    #[test]
    fn test_instance_identity_and_urls() {
        let instance = Instance::new("10.0.0.9".parse().unwrap(), &config());

        assert_eq!(instance.instance_id, "10.0.0.9:BILLING:8080");
        assert_eq!(instance.app, "BILLING");
        assert_eq!(instance.host_name, "10.0.0.9");
        assert_eq!(instance.ip_addr, "10.0.0.9");
        assert_eq!(instance.status, InstanceStatus::Up);
        assert_eq!(instance.overridden_status, Some(InstanceStatus::Unknown));
        assert_eq!(instance.vip_address.as_deref(), Some("BILLING"));
        assert_eq!(
            instance.home_page_url.as_deref(),
            Some("http://10.0.0.9:8080")
        );
        assert_eq!(
            instance.status_page_url.as_deref(),
            Some("http://10.0.0.9:8080/info")
        );
        assert!(instance.health_check_url.is_none());
        assert_eq!(instance.port_value(), 8080);

        let lease = instance.lease_info.unwrap();
        assert_eq!(lease.renewal_interval_in_secs, 30);
        assert_eq!(lease.duration_in_secs, 90);

        let datacenter = instance.data_center_info.unwrap();
        assert_eq!(datacenter.name, "MyOwn");
    }

    #[test]
    fn test_instance_serde_round_trip_preserves_every_field() {
        let instance = Instance::new("10.0.0.9".parse().unwrap(), &config());

        let value = serde_json::to_value(&instance).unwrap();
        assert_eq!(value["instanceId"], "10.0.0.9:BILLING:8080");
        assert_eq!(value["status"], "UP");
        assert_eq!(value["overriddenstatus"], "UNKNOWN");
        assert_eq!(value["port"]["$"], 8080);
        assert_eq!(value["port"]["@enabled"], "true");
        assert_eq!(value["dataCenterInfo"]["name"], "MyOwn");
        assert_eq!(
            value["dataCenterInfo"]["@class"],
            "com.netflix.appinfo.InstanceInfo$DefaultDataCenterInfo"
        );
        assert_eq!(value["leaseInfo"]["renewalIntervalInSecs"], 30);
        assert_eq!(value["leaseInfo"]["durationInSecs"], 90);
        assert_eq!(value["metadata"]["zone"], "eu-west-1");

        let decoded: Instance = serde_json::from_value(value).unwrap();
        assert_eq!(decoded, instance);
    }

    #[test]
    fn test_status_decoding_tolerates_unknown_values() {
        let status: InstanceStatus = serde_json::from_value(json!("OUT_OF_SERVICE")).unwrap();
        assert_eq!(status, InstanceStatus::OutOfService);

        let status: InstanceStatus = serde_json::from_value(json!("PAUSED")).unwrap();
        assert_eq!(status, InstanceStatus::Unknown);
    }

    #[test]
    fn test_decoding_requires_only_instance_identity() {
        let instance: Instance = serde_json::from_value(json!({
            "instanceId": "10.0.0.1:API:80"
        }))
        .unwrap();

        assert_eq!(instance.instance_id, "10.0.0.1:API:80");
        assert_eq!(instance.status, InstanceStatus::Unknown);
        assert!(instance.port.is_none());
        assert!(instance.metadata.is_empty());

        let missing_identity = serde_json::from_value::<Instance>(json!({
            "app": "API"
        }));
        assert!(missing_identity.is_err());
    }

    #[test]
    fn test_datacenter_metadata_uses_kebab_case_keys() {
        let metadata = DataCenterMetadata {
            availability_zone: Some("eu-west-1a".to_string()),
            instance_id: Some("i-0abc".to_string()),
            ..Default::default()
        };

        let value = serde_json::to_value(&metadata).unwrap();
        assert_eq!(value["availability-zone"], "eu-west-1a");
        assert_eq!(value["instance-id"], "i-0abc");
        assert!(value.get("public-ipv4").is_none());
    }

    #[test]
    fn test_disabled_port_flag() {
        let port: Port = serde_json::from_value(json!({"$": 443, "@enabled": "false"})).unwrap();
        assert_eq!(port.value, 443);
        assert!(!port.is_enabled());
    }

    #[test]
    fn test_port_without_enabled_flag_decodes_as_enabled() {
        let port: Port = serde_json::from_value(json!({"$": 8080})).unwrap();
        assert_eq!(port.value, 8080);
        assert!(port.is_enabled());
    }
}
