//! armgrab - retry-until-it-lands launcher for OCI free-tier ARM instances
//!
//! Free-tier `VM.Standard.A1.Flex` capacity comes and goes; armgrab keeps
//! issuing launch requests until one lands, classifying every rejection as
//! "wait longer", "connectivity problem" or "stop now".

pub mod cli;
pub mod config;
pub mod discover;
pub mod domain;
pub mod error;
pub mod id;
pub mod oci;
pub mod provisioner;

pub use error::{ArmgrabError, Result};
