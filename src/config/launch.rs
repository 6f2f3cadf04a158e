//! Launch settings.
//!
//! Loaded from .armgrab.yml or ~/.config/armgrab/armgrab.yml

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{ArmgrabError, Result};

/// User-tunable launch settings for armgrab.
///
/// Anything optional here that is left unset gets filled in by discovery
/// against the tenancy (availability domains, subnet, image).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct LaunchSettings {
    /// Display name for the created instance.
    pub display_name: String,

    /// Compute shape to request.
    pub shape: String,

    /// OCPUs for flexible shapes.
    pub ocpus: f64,

    /// Memory in GBs for flexible shapes.
    pub memory_in_gbs: f64,

    /// Compartment OCID. Defaults to the tenancy root when unset.
    pub compartment_id: Option<String>,

    /// Boot image OCID. Discovered (newest Ubuntu aarch64) when unset.
    pub image_id: Option<String>,

    /// Subnet OCID. Discovered (first subnet of the first VCN) when unset.
    pub subnet_id: Option<String>,

    /// Availability domains to cycle through. Discovered when empty.
    pub availability_domains: Vec<String>,

    /// Path to the SSH public key installed on the instance.
    pub ssh_public_key_file: PathBuf,

    /// Where rejected attempts are appended. None disables the file.
    pub failure_log: Option<PathBuf>,

    /// Per-call HTTP timeout in seconds.
    pub request_timeout_secs: u64,

    /// Retry pacing.
    pub retry: RetrySettings,
}

impl Default for LaunchSettings {
    fn default() -> Self {
        Self {
            display_name: "Armz0".to_string(),
            shape: "VM.Standard.A1.Flex".to_string(),
            ocpus: 4.0,
            memory_in_gbs: 24.0,
            compartment_id: None,
            image_id: None,
            subnet_id: None,
            availability_domains: Vec::new(),
            ssh_public_key_file: default_ssh_key_path(),
            failure_log: Some(PathBuf::from("faillog.txt")),
            request_timeout_secs: 60,
            retry: RetrySettings::default(),
        }
    }
}

/// Retry pacing knobs.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RetrySettings {
    /// Delay after a capacity rejection, in seconds.
    pub interval_secs: u64,

    /// Delay after a throttle or transport failure, in seconds.
    pub transport_interval_secs: u64,

    /// Random jitter applied to every delay, +/- this many seconds.
    pub jitter_secs: u64,

    /// Attempt cap. None means loop until capacity appears or the
    /// operator interrupts.
    pub max_attempts: Option<u64>,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            interval_secs: 5,
            transport_interval_secs: 60,
            jitter_secs: 2,
            max_attempts: None,
        }
    }
}

impl LaunchSettings {
    /// Load settings with fallback chain.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. .armgrab.yml in current directory
    /// 3. ~/.config/armgrab/armgrab.yml
    /// 4. Defaults
    pub fn load(config_path: Option<&PathBuf>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_from_file(path);
        }

        let project_config = PathBuf::from(".armgrab.yml");
        if project_config.exists() {
            match Self::load_from_file(&project_config) {
                Ok(settings) => {
                    log::info!("Loaded settings from .armgrab.yml");
                    return Ok(settings);
                }
                Err(e) => {
                    log::warn!("Failed to load .armgrab.yml: {}", e);
                }
            }
        }

        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("armgrab").join("armgrab.yml");
            if user_config.exists() {
                match Self::load_from_file(&user_config) {
                    Ok(settings) => {
                        log::info!("Loaded settings from {}", user_config.display());
                        return Ok(settings);
                    }
                    Err(e) => {
                        log::warn!("Failed to load {}: {}", user_config.display(), e);
                    }
                }
            }
        }

        log::info!("No settings file found, using defaults");
        Ok(Self::default())
    }

    fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path).map_err(|e| {
            ArmgrabError::Config(format!("cannot read {}: {}", path.as_ref().display(), e))
        })?;
        serde_yaml::from_str(&content)
            .map_err(|e| ArmgrabError::Config(format!("cannot parse {}: {}", path.as_ref().display(), e)))
    }

    /// Read the SSH public key this configuration points at.
    pub fn read_ssh_public_key(&self) -> Result<String> {
        let key = fs::read_to_string(&self.ssh_public_key_file).map_err(|e| {
            ArmgrabError::Config(format!(
                "cannot read SSH public key {}: {}",
                self.ssh_public_key_file.display(),
                e
            ))
        })?;
        Ok(key.trim_end().to_string())
    }

    /// Sanity-check pacing values.
    pub fn validate(&self) -> Result<()> {
        if self.retry.interval_secs == 0 {
            return Err(ArmgrabError::Config("retry.interval_secs must be > 0".to_string()));
        }
        if self.retry.transport_interval_secs == 0 {
            return Err(ArmgrabError::Config(
                "retry.transport_interval_secs must be > 0".to_string(),
            ));
        }
        if self.request_timeout_secs == 0 {
            return Err(ArmgrabError::Config("request_timeout_secs must be > 0".to_string()));
        }
        if let Some(0) = self.retry.max_attempts {
            return Err(ArmgrabError::Config("retry.max_attempts must be > 0 when set".to_string()));
        }
        Ok(())
    }
}

fn default_ssh_key_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".ssh")
        .join("id_rsa.pub")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_target_free_tier_arm() {
        let settings = LaunchSettings::default();
        assert_eq!(settings.shape, "VM.Standard.A1.Flex");
        assert_eq!(settings.ocpus, 4.0);
        assert_eq!(settings.memory_in_gbs, 24.0);
        assert!(settings.image_id.is_none());
        assert!(settings.retry.max_attempts.is_none());
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"display_name: grabber\nretry:\n  interval_secs: 10\n")
            .unwrap();

        let settings = LaunchSettings::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(settings.display_name, "grabber");
        assert_eq!(settings.retry.interval_secs, 10);
        // Untouched fields fall back to defaults
        assert_eq!(settings.retry.transport_interval_secs, 60);
        assert_eq!(settings.shape, "VM.Standard.A1.Flex");
    }

    #[test]
    fn test_full_yaml_round_trip() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(
            b"shape: VM.Standard.A1.Flex\n\
              ocpus: 2\n\
              memory_in_gbs: 12\n\
              image_id: ocid1.image.oc1..aaaa\n\
              subnet_id: ocid1.subnet.oc1..bbbb\n\
              availability_domains:\n  - Uocm:PHX-AD-1\n\
              failure_log: null\n",
        )
        .unwrap();

        let settings = LaunchSettings::load(Some(&file.path().to_path_buf())).unwrap();
        assert_eq!(settings.ocpus, 2.0);
        assert_eq!(settings.image_id.as_deref(), Some("ocid1.image.oc1..aaaa"));
        assert_eq!(settings.availability_domains, vec!["Uocm:PHX-AD-1"]);
        assert!(settings.failure_log.is_none());
    }

    #[test]
    fn test_unreadable_explicit_path_is_an_error() {
        let missing = PathBuf::from("/definitely/not/here.yml");
        assert!(LaunchSettings::load(Some(&missing)).is_err());
    }

    #[test]
    fn test_zero_interval_fails_validation() {
        let mut settings = LaunchSettings::default();
        settings.retry.interval_secs = 0;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_zero_max_attempts_fails_validation() {
        let mut settings = LaunchSettings::default();
        settings.retry.max_attempts = Some(0);
        assert!(settings.validate().is_err());
    }
}
