//! Error types for armgrab
//!
//! Centralized error handling using thiserror.

use thiserror::Error;

/// All error types that can occur in armgrab
#[derive(Debug, Error)]
pub enum ArmgrabError {
    /// Missing or invalid configuration (detected before any network call)
    #[error("Configuration error: {0}")]
    Config(String),

    /// OCI credentials profile problem (missing file, missing key, bad PEM)
    #[error("Profile error: {0}")]
    Profile(String),

    /// Request signing failure
    #[error("Signing error: {0}")]
    Signing(String),

    /// Unrecoverable API rejection (auth, bad request, quota)
    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    /// Resource discovery came up empty
    #[error("Discovery error: {0}")]
    Discovery(String),

    /// Attempt cap reached without a successful launch
    #[error("Gave up after {0} attempts without capacity")]
    AttemptsExhausted(u64),

    /// Interrupted by the operator before a launch succeeded
    #[error("Interrupted")]
    Interrupted,

    /// HTTP transport error
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ArmgrabError {
    /// Whether this error should abort the retry loop.
    ///
    /// Everything here is terminal except transport errors, which the
    /// provisioner retries on its own schedule.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, ArmgrabError::Transport(_))
    }
}

/// Result type alias for armgrab operations
pub type Result<T> = std::result::Result<T, ArmgrabError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_error_display() {
        let err = ArmgrabError::Config("missing subnet_id".to_string());
        assert_eq!(err.to_string(), "Configuration error: missing subnet_id");
    }

    #[test]
    fn test_api_error_display() {
        let err = ArmgrabError::Api {
            status: 401,
            code: "NotAuthenticated".to_string(),
            message: "The required information to complete authentication was not provided".to_string(),
        };
        assert!(err.to_string().starts_with("API error 401 (NotAuthenticated)"));
        assert!(err.is_fatal());
    }

    #[test]
    fn test_attempts_exhausted_display() {
        let err = ArmgrabError::AttemptsExhausted(50);
        assert_eq!(err.to_string(), "Gave up after 50 attempts without capacity");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: ArmgrabError = io_err.into();
        assert!(matches!(err, ArmgrabError::Io(_)));
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_result_type_alias() {
        fn returns_ok() -> Result<i32> {
            Ok(42)
        }

        assert!(returns_ok().is_ok());
    }
}
