//! Environment variable parsing for configuration.
//!
//! Responsibilities:
//! - Read and parse `MYBMW_*` environment variables.
//! - Apply environment variable values to a ConfigLoader instance.
//!
//! Does NOT handle:
//! - Building the final Config (see builder.rs).
//! - .env file loading (handled by ConfigLoader::load_dotenv).
//!
//! Invariants:
//! - Empty or whitespace-only environment variables are treated as unset.
//! - Returned values are trimmed (leading/trailing whitespace removed).
//! - Invalid values return ConfigError::InvalidValue.

use secrecy::SecretString;
use std::time::Duration;

use super::builder::ConfigLoader;
use super::error::ConfigError;
use crate::types::Region;

pub const ENV_USERNAME: &str = "MYBMW_USERNAME";
pub const ENV_PASSWORD: &str = "MYBMW_PASSWORD";
pub const ENV_REGION: &str = "MYBMW_REGION";
pub const ENV_CAPTCHA_TOKEN: &str = "MYBMW_CAPTCHA_TOKEN";
pub const ENV_TIMEOUT: &str = "MYBMW_TIMEOUT";
pub const ENV_SERVER_URL: &str = "MYBMW_SERVER_URL";
pub const ENV_CHINA_AUTH_URL: &str = "MYBMW_CHINA_AUTH_URL";

/// Read an environment variable, returning None if unset, empty, or whitespace-only.
/// Returns the trimmed value (leading/trailing whitespace removed) if present.
pub fn env_var_or_none(key: &str) -> Option<String> {
    std::env::var(key).ok().and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else if trimmed.len() == s.len() {
            Some(s)
        } else {
            Some(trimmed.to_string())
        }
    })
}

/// Apply environment variable configuration to the loader.
pub fn apply_env(loader: &mut ConfigLoader) -> Result<(), ConfigError> {
    if let Some(username) = env_var_or_none(ENV_USERNAME) {
        loader.set_username(Some(username));
    }
    if let Some(password) = env_var_or_none(ENV_PASSWORD) {
        loader.set_password(Some(SecretString::new(password.into())));
    }
    if let Some(region) = env_var_or_none(ENV_REGION) {
        let region: Region = region.parse().map_err(|e| ConfigError::InvalidValue {
            var: ENV_REGION.to_string(),
            message: format!("{e}"),
        })?;
        loader.set_region(Some(region));
    }
    if let Some(token) = env_var_or_none(ENV_CAPTCHA_TOKEN) {
        loader.set_captcha_token(Some(SecretString::new(token.into())));
    }
    if let Some(timeout) = env_var_or_none(ENV_TIMEOUT) {
        let secs: u64 = timeout.parse().map_err(|_| ConfigError::InvalidValue {
            var: ENV_TIMEOUT.to_string(),
            message: "must be a number".to_string(),
        })?;
        loader.set_timeout(Some(Duration::from_secs(secs)));
    }
    if let Some(url) = env_var_or_none(ENV_SERVER_URL) {
        loader.set_server_url(Some(url));
    }
    if let Some(url) = env_var_or_none(ENV_CHINA_AUTH_URL) {
        loader.set_china_auth_url(Some(url));
    }
    Ok(())
}
