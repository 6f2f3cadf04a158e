//! Classified outcome of a single launch attempt.

use crate::error::ArmgrabError;

/// What a successful launch hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaunchedInstance {
    /// OCID of the created instance.
    pub id: String,
    /// Availability domain the instance landed in.
    pub availability_domain: String,
    /// Lifecycle state reported by the create call (typically PROVISIONING).
    pub lifecycle_state: String,
}

/// Tagged outcome of one create-instance call.
///
/// The provisioner's whole job is mapping these to "return", "sleep and
/// retry" or "abort".
#[derive(Debug)]
pub enum AttemptResult {
    /// The instance was created - terminal success.
    Launched(LaunchedInstance),

    /// No physical hosts available for the requested shape right now.
    /// Retryable for as long as the operator is willing to wait.
    OutOfCapacity { message: String },

    /// The API asked us to slow down (HTTP 429). Retryable with a longer delay.
    Throttled { message: String },

    /// The call never produced a definitive answer (timeout, connection
    /// reset, 5xx without a capacity message). Retryable, but logged
    /// distinctly so "no capacity yet" and "connectivity problem" are
    /// tellable apart.
    Transport { message: String },

    /// Anything else: auth failure, malformed request, quota limit.
    /// Retrying would not change the outcome.
    Fatal(ArmgrabError),
}

impl AttemptResult {
    /// Whether the provisioner should keep looping after this outcome.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            AttemptResult::OutOfCapacity { .. } | AttemptResult::Throttled { .. } | AttemptResult::Transport { .. }
        )
    }

    /// True only for a definitive rejection from the API (as opposed to a
    /// transport failure where the request may or may not have been seen).
    /// Definitive rejections get a fresh retry token on the next attempt.
    pub fn is_definitive_rejection(&self) -> bool {
        matches!(self, AttemptResult::OutOfCapacity { .. } | AttemptResult::Throttled { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_is_retryable() {
        let result = AttemptResult::OutOfCapacity {
            message: "Out of host capacity.".to_string(),
        };
        assert!(result.is_retryable());
        assert!(result.is_definitive_rejection());
    }

    #[test]
    fn test_transport_is_retryable_but_not_definitive() {
        let result = AttemptResult::Transport {
            message: "connection reset by peer".to_string(),
        };
        assert!(result.is_retryable());
        assert!(!result.is_definitive_rejection());
    }

    #[test]
    fn test_fatal_is_not_retryable() {
        let result = AttemptResult::Fatal(ArmgrabError::Api {
            status: 401,
            code: "NotAuthenticated".to_string(),
            message: "bad signature".to_string(),
        });
        assert!(!result.is_retryable());
        assert!(!result.is_definitive_rejection());
    }

    #[test]
    fn test_launched_is_terminal() {
        let result = AttemptResult::Launched(LaunchedInstance {
            id: "ocid1.instance.oc1..aaaa".to_string(),
            availability_domain: "Uocm:PHX-AD-1".to_string(),
            lifecycle_state: "PROVISIONING".to_string(),
        });
        assert!(!result.is_retryable());
    }
}
