//! OCI credentials profile.
//!
//! Parses the standard `~/.oci/config` INI file the way the OCI SDKs do:
//! bracketed profile sections, `key = value` lines, `#`/`;` comments.
//! Only the handful of keys the signer needs are kept.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ArmgrabError, Result};

/// Profile used when none is named.
pub const DEFAULT_PROFILE: &str = "DEFAULT";

/// Credentials and identity for one OCI profile.
#[derive(Debug, Clone)]
pub struct OciProfile {
    /// User OCID.
    pub user: String,
    /// Public key fingerprint registered for the user.
    pub fingerprint: String,
    /// Tenancy OCID.
    pub tenancy: String,
    /// Region identifier, e.g. `us-phoenix-1`.
    pub region: String,
    /// Path to the PEM-encoded API signing key.
    pub key_file: PathBuf,
}

impl OciProfile {
    /// Load a profile from the standard search path.
    ///
    /// Search order:
    /// 1. Explicit path if provided
    /// 2. `$OCI_CLI_CONFIG_FILE`
    /// 3. `~/.oci/config`
    ///
    /// The profile name defaults to `$OCI_CLI_PROFILE`, then `DEFAULT`.
    pub fn load(config_path: Option<&PathBuf>, profile: Option<&str>) -> Result<Self> {
        let path = match config_path {
            Some(path) => path.clone(),
            None => match std::env::var("OCI_CLI_CONFIG_FILE") {
                Ok(env_path) if !env_path.is_empty() => PathBuf::from(env_path),
                _ => default_config_path()?,
            },
        };

        let env_profile = std::env::var("OCI_CLI_PROFILE").ok();
        let profile_name = profile
            .or(env_profile.as_deref())
            .filter(|name| !name.is_empty())
            .unwrap_or(DEFAULT_PROFILE);

        log::info!("Loading OCI profile '{}' from {}", profile_name, path.display());
        Self::load_from_file(&path, profile_name)
    }

    /// Parse a specific profile out of a config file.
    pub fn load_from_file(path: &Path, profile: &str) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| {
            ArmgrabError::Profile(format!("cannot read OCI config {}: {}", path.display(), e))
        })?;

        let sections = parse_ini(&content);
        let section = sections
            .get(profile)
            .ok_or_else(|| ArmgrabError::Profile(format!("profile [{}] not found in {}", profile, path.display())))?;

        let get = |key: &str| -> Result<String> {
            section
                .get(key)
                .cloned()
                .ok_or_else(|| ArmgrabError::Profile(format!("profile [{}] is missing '{}'", profile, key)))
        };

        Ok(Self {
            user: get("user")?,
            fingerprint: get("fingerprint")?,
            tenancy: get("tenancy")?,
            region: get("region")?,
            key_file: expand_tilde(&get("key_file")?),
        })
    }

    /// Read the PEM private key this profile points at.
    pub fn read_key_pem(&self) -> Result<String> {
        fs::read_to_string(&self.key_file).map_err(|e| {
            ArmgrabError::Profile(format!("cannot read key file {}: {}", self.key_file.display(), e))
        })
    }

    /// The signature keyId: `tenancy/user/fingerprint`.
    pub fn key_id(&self) -> String {
        format!("{}/{}/{}", self.tenancy, self.user, self.fingerprint)
    }
}

fn default_config_path() -> Result<PathBuf> {
    dirs::home_dir()
        .map(|home| home.join(".oci").join("config"))
        .ok_or_else(|| ArmgrabError::Profile("cannot determine home directory".to_string()))
}

/// Expand a leading `~/` against the home directory.
fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

/// Minimal INI parser: sections, `key = value`, `#`/`;` comments.
fn parse_ini(content: &str) -> HashMap<String, HashMap<String, String>> {
    let mut sections: HashMap<String, HashMap<String, String>> = HashMap::new();
    let mut current = String::new();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with(';') {
            continue;
        }
        if let Some(name) = line.strip_prefix('[').and_then(|rest| rest.strip_suffix(']')) {
            current = name.trim().to_string();
            sections.entry(current.clone()).or_default();
            continue;
        }
        if let Some((key, value)) = line.split_once('=') {
            sections
                .entry(current.clone())
                .or_default()
                .insert(key.trim().to_string(), value.trim().to_string());
        }
    }

    sections
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    const SAMPLE: &str = "\
# comment line
[DEFAULT]
user = ocid1.user.oc1..aaaa
fingerprint = 12:34:56:78
tenancy = ocid1.tenancy.oc1..bbbb
region = us-phoenix-1
key_file = /keys/oci_api_key.pem

[ALT]
user = ocid1.user.oc1..cccc
fingerprint = ab:cd:ef:01
tenancy = ocid1.tenancy.oc1..dddd
region = eu-frankfurt-1
key_file = /keys/alt_key.pem
";

    fn write_sample() -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(SAMPLE.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_default_profile() {
        let file = write_sample();
        let profile = OciProfile::load_from_file(file.path(), "DEFAULT").unwrap();
        assert_eq!(profile.user, "ocid1.user.oc1..aaaa");
        assert_eq!(profile.region, "us-phoenix-1");
        assert_eq!(profile.key_file, PathBuf::from("/keys/oci_api_key.pem"));
    }

    #[test]
    fn test_load_named_profile() {
        let file = write_sample();
        let profile = OciProfile::load_from_file(file.path(), "ALT").unwrap();
        assert_eq!(profile.region, "eu-frankfurt-1");
    }

    #[test]
    fn test_missing_profile_is_an_error() {
        let file = write_sample();
        let err = OciProfile::load_from_file(file.path(), "NOPE").unwrap_err();
        assert!(err.to_string().contains("profile [NOPE] not found"));
    }

    #[test]
    fn test_missing_key_reports_which_one() {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(b"[DEFAULT]\nuser = ocid1.user.oc1..aaaa\n").unwrap();
        let err = OciProfile::load_from_file(file.path(), "DEFAULT").unwrap_err();
        assert!(err.to_string().contains("'fingerprint'"));
    }

    #[test]
    fn test_key_id_layout() {
        let file = write_sample();
        let profile = OciProfile::load_from_file(file.path(), "DEFAULT").unwrap();
        assert_eq!(
            profile.key_id(),
            "ocid1.tenancy.oc1..bbbb/ocid1.user.oc1..aaaa/12:34:56:78"
        );
    }

    #[test]
    fn test_expand_tilde_leaves_absolute_paths_alone() {
        assert_eq!(expand_tilde("/abs/key.pem"), PathBuf::from("/abs/key.pem"));
    }
}
