//! OCI REST client implementation
//!
//! This module implements the ComputeApi trait against the OCI Core
//! Services and Identity endpoints, with signed requests and a bounded
//! per-call timeout.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;

use crate::config::OciProfile;
use crate::domain::{AttemptResult, LaunchedInstance};
use crate::error::{ArmgrabError, Result};
use crate::oci::api::ComputeApi;
use crate::oci::models::{ApiErrorBody, AvailabilityDomain, Image, Instance, LaunchInstanceDetails, Subnet, Vcn};
use crate::oci::signer::{RequestSigner, http_date};

/// Core/Identity API version segment.
const API_VERSION: &str = "20160918";

/// Default per-call timeout (distinct from the unbounded outer retry loop).
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Signed client for the handful of OCI operations armgrab uses.
pub struct OciClient {
    http: Client,
    signer: RequestSigner,
    region: String,
}

impl OciClient {
    /// Build a client from a credentials profile.
    pub fn new(profile: &OciProfile, timeout: Option<Duration>) -> Result<Self> {
        let pem = profile.read_key_pem()?;
        let signer = RequestSigner::new(profile.key_id(), &pem)?;

        let http = Client::builder()
            .timeout(timeout.unwrap_or(DEFAULT_TIMEOUT))
            .build()
            .map_err(ArmgrabError::Transport)?;

        Ok(Self {
            http,
            signer,
            region: profile.region.clone(),
        })
    }

    fn core_host(&self) -> String {
        format!("iaas.{}.oraclecloud.com", self.region)
    }

    fn identity_host(&self) -> String {
        format!("identity.{}.oraclecloud.com", self.region)
    }

    /// Signed GET returning deserialized JSON; any non-2xx is fatal here
    /// (list endpoints are only used for discovery).
    async fn get_json<T: DeserializeOwned>(&self, host: &str, path_and_query: &str) -> Result<T> {
        let date = http_date();
        let signed = self.signer.sign("GET", host, path_and_query, &date, None)?;

        let response = self
            .http
            .get(format!("https://{}{}", host, path_and_query))
            .header("date", &signed.date)
            .header("authorization", &signed.authorization)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(response.json::<T>().await?);
        }

        let body = response.text().await.unwrap_or_default();
        let parsed = parse_error_body(&body);
        Err(ArmgrabError::Api {
            status: status.as_u16(),
            code: parsed.code,
            message: parsed.message,
        })
    }
}

#[async_trait]
impl ComputeApi for OciClient {
    async fn launch_instance(&self, details: &LaunchInstanceDetails, retry_token: &str) -> AttemptResult {
        let host = self.core_host();
        let path = format!("/{}/instances", API_VERSION);

        let body = match serde_json::to_vec(details) {
            Ok(body) => body,
            Err(e) => return AttemptResult::Fatal(ArmgrabError::Json(e)),
        };

        let date = http_date();
        let signed = match self.signer.sign("POST", &host, &path, &date, Some(&body)) {
            Ok(signed) => signed,
            Err(e) => return AttemptResult::Fatal(e),
        };

        let mut request = self
            .http
            .post(format!("https://{}{}", host, path))
            .header("date", &signed.date)
            .header("authorization", &signed.authorization)
            .header("content-type", "application/json")
            .header("opc-retry-token", retry_token)
            .body(body);
        if let Some(digest) = &signed.content_sha256 {
            request = request.header("x-content-sha256", digest);
        }

        let response = match request.send().await {
            Ok(response) => response,
            Err(e) => {
                return AttemptResult::Transport {
                    message: e.to_string(),
                };
            }
        };

        let status = response.status();
        if status.is_success() {
            return match response.json::<Instance>().await {
                Ok(instance) => AttemptResult::Launched(LaunchedInstance {
                    id: instance.id,
                    availability_domain: instance.availability_domain,
                    lifecycle_state: instance.lifecycle_state,
                }),
                Err(e) => AttemptResult::Fatal(ArmgrabError::Transport(e)),
            };
        }

        let body = response.text().await.unwrap_or_default();
        let parsed = parse_error_body(&body);
        classify_rejection(status.as_u16(), &parsed.code, &parsed.message)
    }

    async fn list_images(&self, compartment_id: &str, shape: &str) -> Result<Vec<Image>> {
        let path = format!("/{}/images?compartmentId={}&shape={}", API_VERSION, compartment_id, shape);
        self.get_json(&self.core_host(), &path).await
    }

    async fn list_vcns(&self, compartment_id: &str) -> Result<Vec<Vcn>> {
        let path = format!("/{}/vcns?compartmentId={}", API_VERSION, compartment_id);
        self.get_json(&self.core_host(), &path).await
    }

    async fn list_subnets(&self, compartment_id: &str, vcn_id: &str) -> Result<Vec<Subnet>> {
        let path = format!("/{}/subnets?compartmentId={}&vcnId={}", API_VERSION, compartment_id, vcn_id);
        self.get_json(&self.core_host(), &path).await
    }

    async fn list_availability_domains(&self, compartment_id: &str) -> Result<Vec<AvailabilityDomain>> {
        let path = format!("/{}/availabilityDomains?compartmentId={}", API_VERSION, compartment_id);
        self.get_json(&self.identity_host(), &path).await
    }
}

fn parse_error_body(body: &str) -> ApiErrorBody {
    serde_json::from_str(body).unwrap_or_else(|_| ApiErrorBody {
        code: "Unknown".to_string(),
        message: if body.is_empty() {
            "empty error body".to_string()
        } else {
            body.to_string()
        },
    })
}

/// Map a non-2xx launch response to an attempt outcome.
///
/// - Capacity exhaustion arrives as HTTP 500 with an "Out of host
///   capacity" message (sometimes a dedicated OutOfHostCapacity code).
/// - 429 means slow down, not stop.
/// - Other 5xx are treated like transport failures: the service had a
///   problem, not the request.
/// - Everything else is a definitive no; retrying cannot change it.
fn classify_rejection(status: u16, code: &str, message: &str) -> AttemptResult {
    let capacity = code == "OutOfHostCapacity" || message.to_lowercase().contains("out of host capacity");

    if status >= 500 && capacity {
        return AttemptResult::OutOfCapacity {
            message: message.to_string(),
        };
    }
    if status == 429 {
        return AttemptResult::Throttled {
            message: message.to_string(),
        };
    }
    if status >= 500 {
        return AttemptResult::Transport {
            message: format!("{} ({}): {}", status, code, message),
        };
    }
    AttemptResult::Fatal(ArmgrabError::Api {
        status,
        code: code.to_string(),
        message: message.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_rejection_classified_retryable() {
        let result = classify_rejection(500, "InternalError", "Out of host capacity.");
        assert!(matches!(result, AttemptResult::OutOfCapacity { .. }));
    }

    #[test]
    fn test_dedicated_capacity_code_classified_retryable() {
        let result = classify_rejection(500, "OutOfHostCapacity", "no hosts");
        assert!(matches!(result, AttemptResult::OutOfCapacity { .. }));
    }

    #[test]
    fn test_throttle_classified_separately() {
        let result = classify_rejection(429, "TooManyRequests", "slow down");
        assert!(matches!(result, AttemptResult::Throttled { .. }));
    }

    #[test]
    fn test_plain_500_is_transport_not_fatal() {
        let result = classify_rejection(500, "InternalError", "unexpected condition");
        assert!(matches!(result, AttemptResult::Transport { .. }));
    }

    #[test]
    fn test_auth_failure_is_fatal() {
        let result = classify_rejection(401, "NotAuthenticated", "bad signature");
        match result {
            AttemptResult::Fatal(ArmgrabError::Api { status, code, .. }) => {
                assert_eq!(status, 401);
                assert_eq!(code, "NotAuthenticated");
            }
            other => panic!("expected fatal, got {:?}", other),
        }
    }

    #[test]
    fn test_quota_limit_is_fatal() {
        let result = classify_rejection(400, "LimitExceeded", "service limit reached");
        assert!(matches!(result, AttemptResult::Fatal(_)));
    }

    #[test]
    fn test_error_body_fallback_keeps_raw_text() {
        let parsed = parse_error_body("<html>gateway timeout</html>");
        assert_eq!(parsed.code, "Unknown");
        assert!(parsed.message.contains("gateway timeout"));
    }
}
