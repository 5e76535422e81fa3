//! CLI exit codes for scripting and automation.
//!
//! Responsibilities:
//! - Define structured exit codes that scripts can use to distinguish error types.
//! - Map ClientError variants to appropriate exit codes.
//!
//! Does NOT handle:
//! - Error message formatting (handled by anyhow Display).
//!
//! Invariants:
//! - Exit codes 1-8 are reserved for specific error categories.

use mybmw_client::ClientError;
use mybmw_config::ConfigError;

/// Structured exit codes for mybmw-cli.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitCode {
    /// Command completed successfully.
    Success = 0,

    /// Unhandled or generic failure.
    GeneralError = 1,

    /// Login rejected or a request stayed unauthorized after re-login.
    ///
    /// Scripts should refresh credentials or obtain a new captcha token.
    AuthenticationFailed = 2,

    /// Network, timeout, or DNS failure.
    ConnectionError = 3,

    /// The requested API path does not exist.
    NotFound = 4,

    /// Invalid configuration or unexpected response shape.
    ValidationError = 5,

    /// Forbidden without a quota hint.
    PermissionDenied = 6,

    /// Rate limit or quota still exceeded after all retries.
    ///
    /// Scripts may retry later.
    RateLimited = 7,

    /// Upstream unavailable (502, 503, 504).
    ServiceUnavailable = 8,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Whether a script could reasonably retry the same command.
    pub fn is_retryable(self) -> bool {
        matches!(
            self,
            ExitCode::ConnectionError | ExitCode::RateLimited | ExitCode::ServiceUnavailable
        )
    }
}

impl From<&ClientError> for ExitCode {
    fn from(err: &ClientError) -> Self {
        match err {
            // Missing captcha token or incomplete builder settings
            ClientError::Configuration(_) => ExitCode::ValidationError,

            ClientError::ApiError {
                status, message, ..
            } => match status {
                401 => ExitCode::AuthenticationFailed,
                403 if message.to_lowercase().contains("quota") => ExitCode::RateLimited,
                403 => ExitCode::PermissionDenied,
                404 => ExitCode::NotFound,
                429 => ExitCode::RateLimited,
                502..=504 => ExitCode::ServiceUnavailable,
                _ => ExitCode::GeneralError,
            },

            ClientError::HttpError(e) => {
                if e.is_connect() || e.is_timeout() {
                    ExitCode::ConnectionError
                } else {
                    ExitCode::GeneralError
                }
            }

            ClientError::InvalidResponse(_) => ExitCode::ValidationError,
        }
    }
}

/// Extension trait for anyhow::Error to extract exit codes.
pub trait ExitCodeExt {
    /// Returns ExitCode::GeneralError if the error is neither a ClientError nor a ConfigError.
    fn exit_code(&self) -> ExitCode;
}

impl ExitCodeExt for anyhow::Error {
    fn exit_code(&self) -> ExitCode {
        for cause in self.chain() {
            if let Some(client_err) = cause.downcast_ref::<ClientError>() {
                return ExitCode::from(client_err);
            }
            if cause.downcast_ref::<ConfigError>().is_some() {
                return ExitCode::ValidationError;
            }
        }

        ExitCode::GeneralError
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mybmw_client::ErrorOrigin;

    fn api_error(status: u16, message: &str) -> ClientError {
        ClientError::ApiError {
            origin: ErrorOrigin::Api,
            status,
            url: "https://example.test/eadrax-vcs/v5/vehicle-list".to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_exit_code_as_i32() {
        assert_eq!(ExitCode::Success.as_i32(), 0);
        assert_eq!(ExitCode::GeneralError.as_i32(), 1);
        assert_eq!(ExitCode::AuthenticationFailed.as_i32(), 2);
        assert_eq!(ExitCode::ServiceUnavailable.as_i32(), 8);
    }

    #[test]
    fn test_is_retryable() {
        assert!(!ExitCode::Success.is_retryable());
        assert!(!ExitCode::AuthenticationFailed.is_retryable());
        assert!(ExitCode::ConnectionError.is_retryable());
        assert!(ExitCode::RateLimited.is_retryable());
        assert!(ExitCode::ServiceUnavailable.is_retryable());
        assert!(!ExitCode::ValidationError.is_retryable());
    }

    #[test]
    fn test_from_api_error_status() {
        assert_eq!(
            ExitCode::from(&api_error(401, "Unauthorized")),
            ExitCode::AuthenticationFailed
        );
        assert_eq!(ExitCode::from(&api_error(404, "Not Found")), ExitCode::NotFound);
        assert_eq!(
            ExitCode::from(&api_error(429, "Rate limit is exceeded")),
            ExitCode::RateLimited
        );
        assert_eq!(
            ExitCode::from(&api_error(503, "Service Unavailable")),
            ExitCode::ServiceUnavailable
        );
        assert_eq!(
            ExitCode::from(&api_error(500, "boom")),
            ExitCode::GeneralError
        );
    }

    #[test]
    fn test_forbidden_quota_is_rate_limited() {
        assert_eq!(
            ExitCode::from(&api_error(403, "Out of call volume quota.")),
            ExitCode::RateLimited
        );
        assert_eq!(
            ExitCode::from(&api_error(403, "Out of call volume QUOTA")),
            ExitCode::RateLimited
        );
        assert_eq!(
            ExitCode::from(&api_error(403, "access_denied - not mapped")),
            ExitCode::PermissionDenied
        );
    }

    #[test]
    fn test_configuration_error_is_validation() {
        let err = ClientError::Configuration("Missing hCaptcha token".to_string());
        assert_eq!(ExitCode::from(&err), ExitCode::ValidationError);
    }

    #[test]
    fn test_invalid_response_is_validation() {
        let err = ClientError::InvalidResponse("missing code".to_string());
        assert_eq!(ExitCode::from(&err), ExitCode::ValidationError);
    }

    #[test]
    fn test_anyhow_chain_finds_client_error() {
        let err = anyhow::Error::from(api_error(401, "Unauthorized")).context("get failed");
        assert_eq!(err.exit_code(), ExitCode::AuthenticationFailed);
    }

    #[test]
    fn test_anyhow_config_error_is_validation() {
        let err = anyhow::Error::from(ConfigError::MissingRegion);
        assert_eq!(err.exit_code(), ExitCode::ValidationError);
    }

    #[test]
    fn test_anyhow_other_error_is_general() {
        let err = anyhow::anyhow!("something else");
        assert_eq!(err.exit_code(), ExitCode::GeneralError);
    }
}
