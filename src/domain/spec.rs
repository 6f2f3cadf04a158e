//! The resolved launch specification.
//!
//! Built once at startup from the credentials profile, the launch settings
//! file and CLI overrides, with discovery filling any gaps. Never mutated
//! afterwards; the provisioner only reads it.

use serde::{Deserialize, Serialize};

use crate::error::{ArmgrabError, Result};

/// OCPU and memory sizing for a flexible shape.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeProfile {
    pub ocpus: f64,
    pub memory_in_gbs: f64,
}

impl Default for ShapeProfile {
    fn default() -> Self {
        // The full free-tier allotment for VM.Standard.A1.Flex.
        Self {
            ocpus: 4.0,
            memory_in_gbs: 24.0,
        }
    }
}

/// Everything needed to issue a launch-instance call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchSpec {
    /// Compartment (usually the tenancy root) to create the instance in.
    pub compartment_id: String,

    /// Availability domains to cycle through, in order.
    pub availability_domains: Vec<String>,

    /// Compute shape, e.g. `VM.Standard.A1.Flex`.
    pub shape: String,

    /// OCPU/memory sizing for flexible shapes.
    pub shape_profile: ShapeProfile,

    /// Boot image OCID.
    pub image_id: String,

    /// Subnet OCID for the primary VNIC.
    pub subnet_id: String,

    /// Display name for the created instance.
    pub display_name: String,

    /// SSH public key material installed via instance metadata.
    pub ssh_public_key: String,
}

impl LaunchSpec {
    /// Check that every required field is present.
    ///
    /// Runs before the first network call; a miss here is a configuration
    /// error, not an API error.
    pub fn validate(&self) -> Result<()> {
        fn required(field: &str, value: &str) -> Result<()> {
            if value.trim().is_empty() {
                return Err(ArmgrabError::Config(format!("missing required field: {}", field)));
            }
            Ok(())
        }

        required("compartment_id", &self.compartment_id)?;
        required("shape", &self.shape)?;
        required("image_id", &self.image_id)?;
        required("subnet_id", &self.subnet_id)?;
        required("display_name", &self.display_name)?;
        required("ssh_public_key", &self.ssh_public_key)?;

        if self.availability_domains.is_empty() {
            return Err(ArmgrabError::Config(
                "missing required field: availability_domains".to_string(),
            ));
        }
        if self.availability_domains.iter().any(|ad| ad.trim().is_empty()) {
            return Err(ArmgrabError::Config("empty availability domain name".to_string()));
        }
        if self.shape_profile.ocpus <= 0.0 || self.shape_profile.memory_in_gbs <= 0.0 {
            return Err(ArmgrabError::Config(
                "shape profile ocpus and memory_in_gbs must be > 0".to_string(),
            ));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn complete_spec() -> LaunchSpec {
        LaunchSpec {
            compartment_id: "ocid1.tenancy.oc1..aaaa".to_string(),
            availability_domains: vec!["Uocm:PHX-AD-1".to_string(), "Uocm:PHX-AD-2".to_string()],
            shape: "VM.Standard.A1.Flex".to_string(),
            shape_profile: ShapeProfile::default(),
            image_id: "ocid1.image.oc1..bbbb".to_string(),
            subnet_id: "ocid1.subnet.oc1..cccc".to_string(),
            display_name: "Armz0".to_string(),
            ssh_public_key: "ssh-rsa AAAA... user@host".to_string(),
        }
    }

    #[test]
    fn test_complete_spec_validates() {
        assert!(complete_spec().validate().is_ok());
    }

    #[test]
    fn test_missing_subnet_fails_validation() {
        let mut spec = complete_spec();
        spec.subnet_id = String::new();
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("subnet_id"));
    }

    #[test]
    fn test_missing_availability_domains_fails_validation() {
        let mut spec = complete_spec();
        spec.availability_domains.clear();
        let err = spec.validate().unwrap_err();
        assert!(err.to_string().contains("availability_domains"));
    }

    #[test]
    fn test_whitespace_only_field_fails_validation() {
        let mut spec = complete_spec();
        spec.ssh_public_key = "   ".to_string();
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_zero_ocpus_fails_validation() {
        let mut spec = complete_spec();
        spec.shape_profile.ocpus = 0.0;
        assert!(spec.validate().is_err());
    }

    #[test]
    fn test_default_shape_profile_is_full_free_tier() {
        let profile = ShapeProfile::default();
        assert_eq!(profile.ocpus, 4.0);
        assert_eq!(profile.memory_in_gbs, 24.0);
    }
}
