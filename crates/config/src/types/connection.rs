//! Connection configuration types for the MyBMW client.
//!
//! Responsibilities:
//! - Define connection settings (region, timeout, endpoint overrides).
//! - Define the main `Config` structure combining connection and auth.
//!
//! Does NOT handle:
//! - Configuration loading from env (see `loader` module).
//! - Actual network connections (see client crate).
//!
//! Invariants:
//! - `server_url()` falls back to the region lookup table when no override is set.
//! - Default values come from `constants`, not magic numbers.

use std::time::Duration;

use crate::constants::{DEFAULT_CHINA_AUTH_URL, DEFAULT_TIMEOUT_SECS};
use crate::types::auth::AuthConfig;
use crate::types::region::Region;

/// Connection settings for the MyBMW API.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Region selecting identity provider and API server.
    pub region: Region,
    /// Timeout applied to every network call.
    pub timeout: Duration,
    /// Override for the regional server URL (testing and proxies).
    pub server_url: Option<String>,
    /// Base URL of the China mobile login service.
    pub china_auth_url: String,
}

impl ConnectionConfig {
    pub fn new(region: Region) -> Self {
        Self {
            region,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            server_url: None,
            china_auth_url: DEFAULT_CHINA_AUTH_URL.to_string(),
        }
    }

    /// Effective server URL without trailing slashes.
    pub fn server_url(&self) -> String {
        self.server_url
            .clone()
            .unwrap_or_else(|| self.region.config().server_url)
            .trim_end_matches('/')
            .to_string()
    }
}

/// Main configuration structure.
#[derive(Debug, Clone)]
pub struct Config {
    pub connection: ConnectionConfig,
    pub auth: AuthConfig,
}
