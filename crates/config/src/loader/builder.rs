//! Configuration loader builder implementation.
//!
//! Responsibilities:
//! - Provide a builder-pattern `ConfigLoader` for layered configuration merging.
//! - Support loading from `.env`, environment variables, and direct builder methods.
//! - Validate and build the final `Config`.
//!
//! Does NOT handle:
//! - Direct environment variable parsing logic (delegated to env.rs).
//! - Persisting credentials (out of scope for this workspace).
//!
//! Invariants / Assumptions:
//! - Builder methods called after `from_env()` take precedence over environment variables.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.
//! - The `DOTENV_DISABLED` variable is checked before `dotenvy::dotenv()` is called.

use secrecy::SecretString;
use std::time::Duration;

use super::env::apply_env;
use super::error::ConfigError;
use crate::constants::{DEFAULT_CHINA_AUTH_URL, DEFAULT_TIMEOUT_SECS, MAX_TIMEOUT_SECS};
use crate::types::{AuthConfig, Config, ConnectionConfig, Region};

/// Configuration loader that builds config from environment variables and overrides.
#[derive(Default)]
pub struct ConfigLoader {
    username: Option<String>,
    password: Option<SecretString>,
    region: Option<Region>,
    captcha_token: Option<SecretString>,
    timeout: Option<Duration>,
    server_url: Option<String>,
    china_auth_url: Option<String>,
}

impl ConfigLoader {
    /// Create a new configuration loader.
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if dotenv loading is disabled via environment variable.
    fn dotenv_disabled() -> bool {
        matches!(
            std::env::var("DOTENV_DISABLED").ok().as_deref(),
            Some("true") | Some("1")
        )
    }

    /// Load environment variables from .env file if present.
    ///
    /// If `DOTENV_DISABLED` is set to "true" or "1", the .env file is not loaded.
    /// Missing `.env` files are silently ignored.
    ///
    /// SAFETY: Error messages never include raw .env line contents to prevent secret leakage.
    pub fn load_dotenv(self) -> Result<Self, ConfigError> {
        if Self::dotenv_disabled() {
            tracing::debug!("DOTENV_DISABLED is set, skipping .env");
            return Ok(self);
        }

        match dotenvy::dotenv() {
            Ok(path) => {
                tracing::debug!(path = %path.display(), "Loaded .env");
                Ok(self)
            }
            Err(e) if Self::is_not_found(&e) => Ok(self),
            Err(dotenvy::Error::LineParse(_, idx)) => {
                Err(ConfigError::DotenvParse { error_index: idx })
            }
            Err(dotenvy::Error::Io(io_err)) => Err(ConfigError::DotenvIo {
                kind: io_err.kind(),
            }),
            Err(_) => Err(ConfigError::DotenvUnknown),
        }
    }

    fn is_not_found(err: &dotenvy::Error) -> bool {
        matches!(
            err,
            dotenvy::Error::Io(io_err) if io_err.kind() == std::io::ErrorKind::NotFound
        )
    }

    /// Read configuration from `MYBMW_*` environment variables.
    pub fn from_env(mut self) -> Result<Self, ConfigError> {
        apply_env(&mut self)?;
        Ok(self)
    }

    pub fn with_username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }

    pub fn with_password(mut self, password: String) -> Self {
        self.password = Some(SecretString::new(password.into()));
        self
    }

    pub fn with_region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn with_captcha_token(mut self, token: String) -> Self {
        self.captcha_token = Some(SecretString::new(token.into()));
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Override the regional server URL.
    pub fn with_server_url(mut self, url: String) -> Self {
        self.server_url = Some(url);
        self
    }

    /// Override the China mobile login service URL.
    pub fn with_china_auth_url(mut self, url: String) -> Self {
        self.china_auth_url = Some(url);
        self
    }

    /// Build the final configuration.
    pub fn build(self) -> Result<Config, ConfigError> {
        let region = self.region.ok_or(ConfigError::MissingRegion)?;

        let (username, password) = match (self.username, self.password) {
            (Some(username), Some(password)) => (username, password),
            _ => return Err(ConfigError::MissingAuth),
        };

        let timeout = self
            .timeout
            .unwrap_or(Duration::from_secs(DEFAULT_TIMEOUT_SECS));
        validate_timeout(timeout)?;

        let server_url = self
            .server_url
            .as_deref()
            .map(|url| validate_and_normalize_url("server_url", url))
            .transpose()?;
        if let Some(url) = &server_url {
            tracing::debug!(server_url = %url, "Using server URL override");
        }

        let china_auth_url = validate_and_normalize_url(
            "china_auth_url",
            self.china_auth_url
                .as_deref()
                .unwrap_or(DEFAULT_CHINA_AUTH_URL),
        )?;

        let mut auth = AuthConfig::new(username, password);
        auth.captcha_token = self.captcha_token;

        Ok(Config {
            connection: ConnectionConfig {
                region,
                timeout,
                server_url,
                china_auth_url,
            },
            auth,
        })
    }

    pub(crate) fn set_username(&mut self, username: Option<String>) {
        self.username = username;
    }

    pub(crate) fn set_password(&mut self, password: Option<SecretString>) {
        self.password = password;
    }

    pub(crate) fn set_region(&mut self, region: Option<Region>) {
        self.region = region;
    }

    pub(crate) fn set_captcha_token(&mut self, token: Option<SecretString>) {
        self.captcha_token = token;
    }

    pub(crate) fn set_timeout(&mut self, timeout: Option<Duration>) {
        self.timeout = timeout;
    }

    pub(crate) fn set_server_url(&mut self, url: Option<String>) {
        self.server_url = url;
    }

    pub(crate) fn set_china_auth_url(&mut self, url: Option<String>) {
        self.china_auth_url = url;
    }
}

/// Validates the request timeout.
///
/// The timeout must be greater than 0 and must not exceed `MAX_TIMEOUT_SECS`.
fn validate_timeout(timeout: Duration) -> Result<(), ConfigError> {
    let secs = timeout.as_secs();

    if secs == 0 {
        return Err(ConfigError::InvalidTimeout {
            message: "timeout must be greater than 0 seconds".to_string(),
        });
    }

    if secs > MAX_TIMEOUT_SECS {
        return Err(ConfigError::InvalidTimeout {
            message: format!(
                "timeout exceeds maximum allowed value of {} seconds",
                MAX_TIMEOUT_SECS
            ),
        });
    }

    Ok(())
}

fn validate_and_normalize_url(var: &str, raw: &str) -> Result<String, ConfigError> {
    let trimmed = raw.trim();

    let parsed = url::Url::parse(trimmed).map_err(|e| ConfigError::InvalidValue {
        var: var.into(),
        message: format!("must be an absolute http(s) URL with a host: {e}"),
    })?;

    let scheme = parsed.scheme();
    if scheme != "http" && scheme != "https" {
        return Err(ConfigError::InvalidValue {
            var: var.into(),
            message: format!("scheme must be http or https, got: {scheme}"),
        });
    }

    if parsed.host_str().is_none() {
        return Err(ConfigError::InvalidValue {
            var: var.into(),
            message: "host is required".into(),
        });
    }

    Ok(parsed.as_str().trim_end_matches('/').to_string())
}
