//! The retry loop.
//!
//! One launch call per iteration, cycling availability domains, sleeping
//! a jittered interval between rejections. Terminal outcomes: an instance
//! (success), a fatal error, an operator interrupt, or the optional
//! attempt cap.

pub mod faillog;

pub use faillog::FailureLog;

use std::path::PathBuf;
use std::time::Duration;

use rand::Rng;
use tokio::sync::watch;

use crate::config::RetrySettings;
use crate::domain::{AttemptResult, LaunchSpec, LaunchedInstance};
use crate::error::{ArmgrabError, Result};
use crate::id::generate_retry_token;
use crate::oci::{ComputeApi, LaunchInstanceDetails};

/// Runtime options for one provisioning run.
#[derive(Debug, Clone, Default)]
pub struct ProvisionerOptions {
    /// Retry pacing.
    pub retry: RetrySettings,
    /// Where rejections are appended; None disables the file.
    pub failure_log: Option<PathBuf>,
}

/// Run the retry loop until an instance launches or something terminal
/// happens.
///
/// Validates the spec before any network call. `shutdown` flips to true
/// when the operator interrupts; the loop notices it both between
/// attempts and inside the inter-retry delay, so termination never waits
/// longer than one delay interval.
pub async fn run(
    spec: &LaunchSpec,
    api: &impl ComputeApi,
    options: &ProvisionerOptions,
    mut shutdown: watch::Receiver<bool>,
) -> Result<LaunchedInstance> {
    spec.validate()?;

    let failure_log = options.failure_log.as_ref().map(FailureLog::new);

    // One request body per AD, built once; the loop cycles through them
    // the way the original grab script walked its instance list.
    let details: Vec<LaunchInstanceDetails> = spec
        .availability_domains
        .iter()
        .map(|ad| LaunchInstanceDetails::from_spec(spec, ad))
        .collect();

    let mut retry_token = generate_retry_token();
    let mut attempts: u64 = 0;

    for index in (0..details.len()).cycle() {
        if *shutdown.borrow() {
            log::info!("Shutdown requested, stopping before next attempt");
            return Err(ArmgrabError::Interrupted);
        }

        let ad = &spec.availability_domains[index];
        attempts += 1;
        log::info!("Attempt {} in {} (shape {})", attempts, ad, spec.shape);

        let result = api.launch_instance(&details[index], &retry_token).await;

        let delay = match result {
            AttemptResult::Launched(instance) => {
                log::info!(
                    "Launched instance {} in {} after {} attempts",
                    instance.id,
                    instance.availability_domain,
                    attempts
                );
                return Ok(instance);
            }
            AttemptResult::Fatal(error) => {
                log::error!("Unrecoverable error on attempt {}: {}", attempts, error);
                return Err(error);
            }
            AttemptResult::OutOfCapacity { message } => {
                log::info!("{}: still out of capacity ({})", ad, message);
                record_rejection(&failure_log, ad, "out-of-capacity", &message);
                // A fresh token: the next attempt is a new create, not a
                // replay of the rejected one.
                retry_token = generate_retry_token();
                jittered(options.retry.interval_secs, options.retry.jitter_secs)
            }
            AttemptResult::Throttled { message } => {
                log::warn!("{}: throttled by the API ({})", ad, message);
                record_rejection(&failure_log, ad, "throttled", &message);
                retry_token = generate_retry_token();
                jittered(options.retry.transport_interval_secs, options.retry.jitter_secs)
            }
            AttemptResult::Transport { message } => {
                // Distinct from capacity: this is "something is wrong with
                // connectivity", not "still waiting". Same token, so a
                // request the API may have already seen cannot create a
                // second instance.
                log::warn!("{}: transport failure ({})", ad, message);
                record_rejection(&failure_log, ad, "transport", &message);
                jittered(options.retry.transport_interval_secs, options.retry.jitter_secs)
            }
        };

        if let Some(max) = options.retry.max_attempts {
            if attempts >= max {
                log::warn!("Attempt cap of {} reached, giving up", max);
                return Err(ArmgrabError::AttemptsExhausted(attempts));
            }
        }

        tokio::select! {
            _ = tokio::time::sleep(delay) => {}
            changed = shutdown.changed() => {
                if changed.is_ok() && *shutdown.borrow() {
                    log::info!("Shutdown requested during retry delay");
                    return Err(ArmgrabError::Interrupted);
                }
                // Sender gone or spurious wake: finish the pause.
                tokio::time::sleep(delay).await;
            }
        }
    }

    unreachable!("cycle() never ends");
}

fn record_rejection(failure_log: &Option<FailureLog>, ad: &str, kind: &str, message: &str) {
    if let Some(log_file) = failure_log {
        if let Err(e) = log_file.append(ad, kind, message) {
            log::warn!("Failed to write failure log: {}", e);
        }
    }
}

/// Base interval +/- a uniformly random jitter, never below one second.
fn jittered(base_secs: u64, jitter_secs: u64) -> Duration {
    if jitter_secs == 0 {
        return Duration::from_secs(base_secs.max(1));
    }
    let offset = rand::rng().random_range(0..=2 * jitter_secs) as i64 - jitter_secs as i64;
    let secs = (base_secs as i64 + offset).max(1);
    Duration::from_secs(secs as u64)
}
