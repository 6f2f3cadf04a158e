//! Configuration system for armgrab.
//!
//! Two-layer configuration:
//! 1. OCI credentials profile (~/.oci/config, the SDK-standard INI file)
//! 2. Launch settings (.armgrab.yml or ~/.config/armgrab/armgrab.yml),
//!    overridable per-run from the CLI

pub use self::launch::{LaunchSettings, RetrySettings};
pub use self::profile::{DEFAULT_PROFILE, OciProfile};

mod launch;
mod profile;
