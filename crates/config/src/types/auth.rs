//! Account credential types for MyBMW configuration.
//!
//! Responsibilities:
//! - Hold the account username, password and optional captcha token.
//!
//! Does NOT handle:
//! - Token exchange or session state (see the client crate).
//!
//! Invariants:
//! - Secret values use `secrecy::SecretString` so they never appear in `Debug` output.

use secrecy::SecretString;

/// Account credentials used for a full username/password login.
#[derive(Debug, Clone)]
pub struct AuthConfig {
    /// Account username (email address, or mobile number in China).
    pub username: String,
    /// Account password.
    pub password: SecretString,
    /// Single-use captcha token required by the Rest of World / North America login.
    pub captcha_token: Option<SecretString>,
}

impl AuthConfig {
    pub fn new(username: impl Into<String>, password: SecretString) -> Self {
        Self {
            username: username.into(),
            password,
            captcha_token: None,
        }
    }

    pub fn with_captcha_token(mut self, token: SecretString) -> Self {
        self.captcha_token = Some(token);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_auth_config_debug_does_not_expose_password() {
        let config = AuthConfig::new("driver@example.com", SecretString::from("hunter2-secret"));
        let debug_output = format!("{:?}", config);

        assert!(!debug_output.contains("hunter2-secret"));
        assert!(debug_output.contains("driver@example.com"));
    }

    #[test]
    fn test_auth_config_debug_does_not_expose_captcha() {
        let config = AuthConfig::new("driver@example.com", SecretString::from("pw"))
            .with_captcha_token(SecretString::from("P1_captcha-secret"));
        let debug_output = format!("{:?}", config);

        assert!(!debug_output.contains("P1_captcha-secret"));
        assert!(config.captcha_token.is_some());
    }
}
