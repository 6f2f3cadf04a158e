//! CLI command definitions using clap.
//!
//! Defines the main CLI structure and subcommands:
//! - launch: run the retry loop (the default when no subcommand is given)
//! - check: resolve and validate configuration without launching
//! - discover: print the resources discovery would pick

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::config::LaunchSettings;

/// armgrab - retry-until-it-lands launcher for OCI free-tier ARM instances
#[derive(Parser, Debug)]
#[command(name = "armgrab")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Optional launch settings file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Optional OCI credentials file path (defaults to ~/.oci/config)
    #[arg(long, global = true)]
    pub oci_config: Option<PathBuf>,

    /// OCI profile name within the credentials file
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,
}

impl Cli {
    /// Check if verbose mode is enabled
    pub fn is_verbose(&self) -> bool {
        self.verbose
    }
}

/// Main subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the retry loop until an instance launches
    Launch(LaunchArgs),

    /// Resolve and validate configuration, then exit without launching
    Check(LaunchArgs),

    /// Print the availability domains, subnet and image discovery would use
    Discover,
}

/// Per-run overrides for launch settings.
///
/// Anything given here wins over the settings file.
#[derive(Args, Debug, Clone, Default)]
pub struct LaunchArgs {
    /// Display name for the instance
    #[arg(long)]
    pub display_name: Option<String>,

    /// Compute shape
    #[arg(long)]
    pub shape: Option<String>,

    /// OCPUs for flexible shapes
    #[arg(long)]
    pub ocpus: Option<f64>,

    /// Memory in GBs for flexible shapes
    #[arg(long)]
    pub memory_in_gbs: Option<f64>,

    /// Boot image OCID (skips image discovery)
    #[arg(long)]
    pub image_id: Option<String>,

    /// Subnet OCID (skips subnet discovery)
    #[arg(long)]
    pub subnet_id: Option<String>,

    /// Availability domain to target; repeat for several (skips AD discovery)
    #[arg(long = "availability-domain")]
    pub availability_domains: Vec<String>,

    /// Path to the SSH public key to install
    #[arg(long)]
    pub ssh_public_key_file: Option<PathBuf>,

    /// Seconds to wait after a capacity rejection
    #[arg(long)]
    pub interval_secs: Option<u64>,

    /// Give up after this many attempts (default: retry forever)
    #[arg(long)]
    pub max_attempts: Option<u64>,
}

impl LaunchArgs {
    /// Fold CLI overrides into loaded settings.
    pub fn apply(&self, settings: &mut LaunchSettings) {
        if let Some(name) = &self.display_name {
            settings.display_name = name.clone();
        }
        if let Some(shape) = &self.shape {
            settings.shape = shape.clone();
        }
        if let Some(ocpus) = self.ocpus {
            settings.ocpus = ocpus;
        }
        if let Some(memory) = self.memory_in_gbs {
            settings.memory_in_gbs = memory;
        }
        if let Some(image) = &self.image_id {
            settings.image_id = Some(image.clone());
        }
        if let Some(subnet) = &self.subnet_id {
            settings.subnet_id = Some(subnet.clone());
        }
        if !self.availability_domains.is_empty() {
            settings.availability_domains = self.availability_domains.clone();
        }
        if let Some(key_file) = &self.ssh_public_key_file {
            settings.ssh_public_key_file = key_file.clone();
        }
        if let Some(interval) = self.interval_secs {
            settings.retry.interval_secs = interval;
        }
        if let Some(max) = self.max_attempts {
            settings.retry.max_attempts = Some(max);
        }
    }
}
