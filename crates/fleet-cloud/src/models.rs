//! Wire models for the cloud provider REST API

use fleet_core::{BareMetalHost, LifecycleState};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Defined tags: namespace -> (key -> value)
pub type DefinedTags = HashMap<String, HashMap<String, String>>;

/// A compute instance
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    pub display_name: String,
    #[serde(default)]
    pub defined_tags: DefinedTags,
}

/// A bare-metal host entry from the capacity-topology list call
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BareMetalHostSummary {
    pub id: String,
    pub lifecycle_details: LifecycleState,
    #[serde(default)]
    pub instance_id: Option<String>,
    #[serde(default)]
    pub instance_shape: Option<String>,
}

impl From<BareMetalHostSummary> for BareMetalHost {
    fn from(summary: BareMetalHostSummary) -> Self {
        BareMetalHost {
            id: summary.id,
            lifecycle_details: summary.lifecycle_details,
            instance_id: summary.instance_id,
            instance_shape: summary.instance_shape,
        }
    }
}

/// Payload for an instance tag update
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInstanceDetails {
    pub defined_tags: DefinedTags,
}

/// A tag namespace
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagNamespaceSummary {
    pub id: String,
    pub name: String,
}

/// A defined tag key within a namespace
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagSummary {
    pub id: String,
    pub name: String,
}

/// Payload for creating a tag namespace
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagNamespaceDetails {
    pub compartment_id: String,
    pub name: String,
    pub description: String,
}

/// Payload for creating a defined tag key
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTagDetails {
    pub name: String,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_summary_deserialization() {
        let json = r#"{
            "id": "ocid1.computebaremetalhost.oc1..host1",
            "lifecycleDetails": "DEGRADED",
            "instanceId": "ocid1.instance.oc1..inst1",
            "instanceShape": "BM.GPU.H100.8"
        }"#;
        let summary: BareMetalHostSummary = serde_json::from_str(json).unwrap();
        assert_eq!(summary.lifecycle_details, LifecycleState::Degraded);

        let host: BareMetalHost = summary.into();
        assert!(host.instance_id.is_some());
    }

    #[test]
    fn test_host_summary_without_instance() {
        let json = r#"{
            "id": "ocid1.computebaremetalhost.oc1..host2",
            "lifecycleDetails": "AVAILABLE"
        }"#;
        let summary: BareMetalHostSummary = serde_json::from_str(json).unwrap();
        assert!(summary.instance_id.is_none());
        assert!(summary.instance_shape.is_none());
    }

    #[test]
    fn test_instance_defined_tags_roundtrip() {
        let json = r#"{
            "id": "ocid1.instance.oc1..inst1",
            "displayName": "gpu-worker-7",
            "definedTags": {
                "Operations": {"Owner": "hpc-team"}
            }
        }"#;
        let instance: Instance = serde_json::from_str(json).unwrap();
        assert_eq!(instance.display_name, "gpu-worker-7");
        assert_eq!(
            instance.defined_tags["Operations"]["Owner"],
            "hpc-team".to_string()
        );
    }
}
