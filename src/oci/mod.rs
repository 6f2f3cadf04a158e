//! OCI API layer - signed REST client behind a narrow capability trait
//!
//! This module provides:
//! - Wire models for the Core Services / Identity endpoints
//! - Request signing (draft-cavage HTTP Signatures)
//! - The ComputeApi trait the provisioner depends on
//! - OciClient, the real implementation, and MockComputeApi for tests

pub mod api;
pub mod client;
pub mod models;
pub mod signer;

pub use api::{ComputeApi, MockComputeApi};
pub use client::OciClient;
pub use models::{
    ApiErrorBody, AvailabilityDomain, Image, Instance, LaunchInstanceDetails, Subnet, Vcn,
};
pub use signer::{RequestSigner, SignedHeaders, http_date};
