//! Compute API trait definition and mock implementation.
//!
//! The provisioner only ever talks to this trait, so tests substitute a
//! scripted mock and never touch the network.

use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;

use crate::domain::{AttemptResult, LaunchedInstance};
use crate::error::{ArmgrabError, Result};
use crate::oci::models::{AvailabilityDomain, Image, LaunchInstanceDetails, Subnet, Vcn};

/// The slice of the provider API armgrab needs.
///
/// `launch_instance` never fails at the Rust level - every outcome,
/// including transport failures, is folded into an [`AttemptResult`] so
/// the retry loop has exactly one thing to classify.
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// Issue one create-instance call, tagged with an idempotency token.
    async fn launch_instance(&self, details: &LaunchInstanceDetails, retry_token: &str) -> AttemptResult;

    /// Images available for a shape in a compartment.
    async fn list_images(&self, compartment_id: &str, shape: &str) -> Result<Vec<Image>>;

    /// VCNs in a compartment.
    async fn list_vcns(&self, compartment_id: &str) -> Result<Vec<Vcn>>;

    /// Subnets of one VCN.
    async fn list_subnets(&self, compartment_id: &str, vcn_id: &str) -> Result<Vec<Subnet>>;

    /// Availability domains visible to a compartment.
    async fn list_availability_domains(&self, compartment_id: &str) -> Result<Vec<AvailabilityDomain>>;
}

type Responder = Box<dyn Fn(u64) -> AttemptResult + Send + Sync>;

/// Scripted [`ComputeApi`] for tests.
///
/// A responder closure maps the zero-based launch call index to an
/// outcome; every launch call and its retry token are recorded so tests
/// can assert on call counts and token reuse.
pub struct MockComputeApi {
    responder: Responder,
    launch_calls: AtomicU64,
    retry_tokens: Mutex<Vec<String>>,
    launched_ads: Mutex<Vec<String>>,
    availability_domains: Vec<AvailabilityDomain>,
    images: Vec<Image>,
    vcns: Vec<Vcn>,
    subnets: Vec<Subnet>,
}

impl MockComputeApi {
    /// Mock with a custom responder.
    pub fn with_responder(responder: impl Fn(u64) -> AttemptResult + Send + Sync + 'static) -> Self {
        Self {
            responder: Box::new(responder),
            launch_calls: AtomicU64::new(0),
            retry_tokens: Mutex::new(Vec::new()),
            launched_ads: Mutex::new(Vec::new()),
            availability_domains: Vec::new(),
            images: Vec::new(),
            vcns: Vec::new(),
            subnets: Vec::new(),
        }
    }

    /// Every call succeeds, minting sequential instance ids.
    pub fn always_success() -> Self {
        Self::with_responder(|call| {
            AttemptResult::Launched(LaunchedInstance {
                id: format!("ocid1.instance.oc1..mock{}", call),
                availability_domain: "Uocm:PHX-AD-1".to_string(),
                lifecycle_state: "PROVISIONING".to_string(),
            })
        })
    }

    /// Every call is rejected for capacity.
    pub fn always_out_of_capacity() -> Self {
        Self::with_responder(|_| AttemptResult::OutOfCapacity {
            message: "Out of host capacity.".to_string(),
        })
    }

    /// The first `rejections` calls are capacity rejections, then success.
    pub fn capacity_then_success(rejections: u64) -> Self {
        Self::with_responder(move |call| {
            if call < rejections {
                AttemptResult::OutOfCapacity {
                    message: "Out of host capacity.".to_string(),
                }
            } else {
                AttemptResult::Launched(LaunchedInstance {
                    id: "ocid1.instance.oc1..mock0".to_string(),
                    availability_domain: "Uocm:PHX-AD-1".to_string(),
                    lifecycle_state: "PROVISIONING".to_string(),
                })
            }
        })
    }

    /// Every call fails authentication.
    pub fn always_auth_error() -> Self {
        Self::with_responder(|_| {
            AttemptResult::Fatal(ArmgrabError::Api {
                status: 401,
                code: "NotAuthenticated".to_string(),
                message: "The required information to complete authentication was not provided".to_string(),
            })
        })
    }

    /// Seed discovery responses.
    pub fn with_inventory(
        mut self,
        availability_domains: Vec<AvailabilityDomain>,
        vcns: Vec<Vcn>,
        subnets: Vec<Subnet>,
        images: Vec<Image>,
    ) -> Self {
        self.availability_domains = availability_domains;
        self.vcns = vcns;
        self.subnets = subnets;
        self.images = images;
        self
    }

    /// Number of launch calls issued so far.
    pub fn launch_calls(&self) -> u64 {
        self.launch_calls.load(Ordering::SeqCst)
    }

    /// Retry tokens seen, one per launch call.
    pub fn retry_tokens(&self) -> Vec<String> {
        self.retry_tokens.lock().unwrap().clone()
    }

    /// Availability domains targeted, one per launch call.
    pub fn launched_ads(&self) -> Vec<String> {
        self.launched_ads.lock().unwrap().clone()
    }
}

#[async_trait]
impl ComputeApi for MockComputeApi {
    async fn launch_instance(&self, details: &LaunchInstanceDetails, retry_token: &str) -> AttemptResult {
        let call = self.launch_calls.fetch_add(1, Ordering::SeqCst);
        self.retry_tokens.lock().unwrap().push(retry_token.to_string());
        self.launched_ads.lock().unwrap().push(details.availability_domain.clone());
        (self.responder)(call)
    }

    async fn list_images(&self, _compartment_id: &str, _shape: &str) -> Result<Vec<Image>> {
        Ok(self.images.clone())
    }

    async fn list_vcns(&self, _compartment_id: &str) -> Result<Vec<Vcn>> {
        Ok(self.vcns.clone())
    }

    async fn list_subnets(&self, _compartment_id: &str, vcn_id: &str) -> Result<Vec<Subnet>> {
        Ok(self
            .subnets
            .iter()
            .filter(|subnet| subnet.vcn_id.as_deref().map(|id| id == vcn_id).unwrap_or(true))
            .cloned()
            .collect())
    }

    async fn list_availability_domains(&self, _compartment_id: &str) -> Result<Vec<AvailabilityDomain>> {
        Ok(self.availability_domains.clone())
    }
}
