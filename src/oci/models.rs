//! Serde models for the OCI Core Services and Identity REST APIs.
//!
//! Field names follow OCI's wire format (camelCase, with the odd
//! capitalization like `memoryInGBs`). Only the fields armgrab reads or
//! writes are modeled; the API tolerates the rest being absent.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::LaunchSpec;

/// Request body for POST /20160918/instances.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LaunchInstanceDetails {
    pub compartment_id: String,
    pub availability_domain: String,
    pub shape: String,
    pub shape_config: ShapeConfig,
    pub display_name: String,
    pub source_details: InstanceSourceDetails,
    pub create_vnic_details: CreateVnicDetails,
    pub metadata: HashMap<String, String>,
    pub availability_config: AvailabilityConfig,
    pub instance_options: InstanceOptions,
}

impl LaunchInstanceDetails {
    /// Build the launch request for one availability domain of a spec.
    pub fn from_spec(spec: &LaunchSpec, availability_domain: &str) -> Self {
        let mut metadata = HashMap::new();
        metadata.insert("ssh_authorized_keys".to_string(), spec.ssh_public_key.clone());

        Self {
            compartment_id: spec.compartment_id.clone(),
            availability_domain: availability_domain.to_string(),
            shape: spec.shape.clone(),
            shape_config: ShapeConfig {
                ocpus: spec.shape_profile.ocpus,
                memory_in_gbs: spec.shape_profile.memory_in_gbs,
            },
            display_name: spec.display_name.clone(),
            source_details: InstanceSourceDetails {
                source_type: "image".to_string(),
                image_id: spec.image_id.clone(),
            },
            create_vnic_details: CreateVnicDetails {
                subnet_id: spec.subnet_id.clone(),
                assign_public_ip: true,
            },
            metadata,
            availability_config: AvailabilityConfig {
                recovery_action: "RESTORE_INSTANCE".to_string(),
            },
            instance_options: InstanceOptions {
                are_legacy_imds_endpoints_disabled: true,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ShapeConfig {
    pub ocpus: f64,
    #[serde(rename = "memoryInGBs")]
    pub memory_in_gbs: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceSourceDetails {
    pub source_type: String,
    pub image_id: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateVnicDetails {
    pub subnet_id: String,
    pub assign_public_ip: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityConfig {
    pub recovery_action: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InstanceOptions {
    pub are_legacy_imds_endpoints_disabled: bool,
}

/// Response body of a successful launch (and of GET instance).
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Instance {
    pub id: String,
    pub display_name: String,
    pub availability_domain: String,
    pub lifecycle_state: String,
    pub shape: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    pub id: String,
    pub display_name: String,
    pub time_created: DateTime<Utc>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vcn {
    pub id: String,
    pub display_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Subnet {
    pub id: String,
    pub display_name: Option<String>,
    pub vcn_id: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityDomain {
    pub name: String,
    pub id: Option<String>,
}

/// Error body OCI returns on non-2xx responses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorBody {
    pub code: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{LaunchSpec, ShapeProfile};

    fn spec() -> LaunchSpec {
        LaunchSpec {
            compartment_id: "ocid1.tenancy.oc1..aaaa".to_string(),
            availability_domains: vec!["Uocm:PHX-AD-1".to_string()],
            shape: "VM.Standard.A1.Flex".to_string(),
            shape_profile: ShapeProfile::default(),
            image_id: "ocid1.image.oc1..bbbb".to_string(),
            subnet_id: "ocid1.subnet.oc1..cccc".to_string(),
            display_name: "Armz0".to_string(),
            ssh_public_key: "ssh-rsa AAAA... user@host".to_string(),
        }
    }

    #[test]
    fn test_launch_details_wire_names() {
        let details = LaunchInstanceDetails::from_spec(&spec(), "Uocm:PHX-AD-1");
        let json = serde_json::to_value(&details).unwrap();

        assert_eq!(json["compartmentId"], "ocid1.tenancy.oc1..aaaa");
        assert_eq!(json["shapeConfig"]["memoryInGBs"], 24.0);
        assert_eq!(json["sourceDetails"]["sourceType"], "image");
        assert_eq!(json["createVnicDetails"]["assignPublicIp"], true);
        assert_eq!(json["availabilityConfig"]["recoveryAction"], "RESTORE_INSTANCE");
        assert_eq!(json["instanceOptions"]["areLegacyImdsEndpointsDisabled"], true);
        assert_eq!(json["metadata"]["ssh_authorized_keys"], "ssh-rsa AAAA... user@host");
    }

    #[test]
    fn test_instance_deserializes_from_wire() {
        let body = r#"{
            "id": "ocid1.instance.oc1..dddd",
            "displayName": "Armz0",
            "availabilityDomain": "Uocm:PHX-AD-1",
            "lifecycleState": "PROVISIONING",
            "shape": "VM.Standard.A1.Flex",
            "extraFieldWeIgnore": 42
        }"#;
        let instance: Instance = serde_json::from_str(body).unwrap();
        assert_eq!(instance.id, "ocid1.instance.oc1..dddd");
        assert_eq!(instance.lifecycle_state, "PROVISIONING");
    }

    #[test]
    fn test_image_time_created_parses_rfc3339() {
        let body = r#"{
            "id": "ocid1.image.oc1..eeee",
            "displayName": "Canonical-Ubuntu-24.04-aarch64-2025.01.01-0",
            "timeCreated": "2025-01-01T12:00:00.000Z"
        }"#;
        let image: Image = serde_json::from_str(body).unwrap();
        assert_eq!(image.time_created.to_rfc3339(), "2025-01-01T12:00:00+00:00");
    }

    #[test]
    fn test_error_body_parses() {
        let body = r#"{"code": "NotAuthenticated", "message": "signature invalid"}"#;
        let err: ApiErrorBody = serde_json::from_str(body).unwrap();
        assert_eq!(err.code, "NotAuthenticated");
    }
}
