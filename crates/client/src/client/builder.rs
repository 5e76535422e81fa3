//! Client builder for constructing [`MyBmwClient`] instances.
//!
//! This module is responsible for:
//! - Providing a fluent builder API for client configuration
//! - Validating required configuration (region, username, password)
//! - Resuming a session from saved [`Credentials`]
//! - Configuring the underlying HTTP client (timeout, identification headers)
//!
//! # What this module does NOT handle:
//! - Actual API calls (handled by [`MyBmwClient`] methods in `mod.rs`)
//! - Token lifecycle (handled by [`Authenticator`])
//!
//! # Invariants
//! - `region`, `username` and `password` are required before calling `build()`
//! - The server URL is always normalized to have no trailing slashes

use std::time::Duration;

use mybmw_config::constants::{DEFAULT_CHINA_AUTH_URL, DEFAULT_TIMEOUT_SECS, X_USER_AGENT_HEADER};
use mybmw_config::{AuthConfig, Config, ConnectionConfig, Region};
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use secrecy::SecretString;

use crate::auth::{Authenticator, Credentials};
use crate::client::MyBmwClient;
use crate::error::{ClientError, Result};
use crate::metrics::MetricsCollector;

/// Builder for creating a new [`MyBmwClient`].
///
/// # Example
///
/// ```rust,ignore
/// use mybmw_client::MyBmwClient;
/// use mybmw_config::Region;
/// use secrecy::SecretString;
///
/// let client = MyBmwClient::builder()
///     .region(Region::RestOfWorld)
///     .username("driver@example.com".to_string())
///     .password(SecretString::from("secret"))
///     .captcha_token(SecretString::from("P1_..."))
///     .build()?;
/// ```
pub struct MyBmwClientBuilder {
    region: Option<Region>,
    username: Option<String>,
    password: Option<SecretString>,
    captcha_token: Option<SecretString>,
    timeout: Duration,
    server_url: Option<String>,
    china_auth_url: String,
    credentials: Credentials,
    metrics: Option<MetricsCollector>,
}

impl Default for MyBmwClientBuilder {
    fn default() -> Self {
        Self {
            region: None,
            username: None,
            password: None,
            captcha_token: None,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            server_url: None,
            china_auth_url: DEFAULT_CHINA_AUTH_URL.to_string(),
            credentials: Credentials::default(),
            metrics: None,
        }
    }
}

impl MyBmwClientBuilder {
    /// Create a new builder with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn region(mut self, region: Region) -> Self {
        self.region = Some(region);
        self
    }

    pub fn username(mut self, username: String) -> Self {
        self.username = Some(username);
        self
    }

    pub fn password(mut self, password: SecretString) -> Self {
        self.password = Some(password);
        self
    }

    /// Set the single-use captcha token for the next full login.
    ///
    /// Required by the Rest of World / North America flow unless the session
    /// can be resumed with a refresh token.
    pub fn captcha_token(mut self, token: SecretString) -> Self {
        self.captcha_token = Some(token);
        self
    }

    /// Set the timeout applied to every network call.
    ///
    /// Default is 30 seconds. Twice this value is subtracted from token expiry.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Override the regional server URL.
    pub fn server_url(mut self, url: String) -> Self {
        self.server_url = Some(url);
        self
    }

    /// Override the China mobile login service URL.
    pub fn china_auth_url(mut self, url: String) -> Self {
        self.china_auth_url = url;
        self
    }

    /// Resume a previously saved session.
    pub fn credentials(mut self, credentials: Credentials) -> Self {
        self.credentials = credentials;
        self
    }

    /// Set the metrics collector for login and retry counters.
    pub fn metrics(mut self, metrics: MetricsCollector) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Create a client builder from configuration.
    pub fn from_config(mut self, config: &Config) -> Self {
        self.region = Some(config.connection.region);
        self.username = Some(config.auth.username.clone());
        self.password = Some(config.auth.password.clone());
        self.captcha_token = config.auth.captcha_token.clone();
        self.timeout = config.connection.timeout;
        self.server_url = config.connection.server_url.clone();
        self.china_auth_url = config.connection.china_auth_url.clone();
        self
    }

    fn normalize_url(url: String) -> String {
        url.trim_end_matches('/').to_string()
    }

    /// Build the [`MyBmwClient`] with the configured options.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Configuration`] if a required field is missing.
    /// Returns `ClientError::HttpError` if the HTTP client fails to build.
    pub fn build(self) -> Result<MyBmwClient> {
        let region = self
            .region
            .ok_or_else(|| ClientError::Configuration("region is required".to_string()))?;
        let username = self
            .username
            .ok_or_else(|| ClientError::Configuration("username is required".to_string()))?;
        let password = self
            .password
            .ok_or_else(|| ClientError::Configuration("password is required".to_string()))?;

        let mut connection = ConnectionConfig::new(region);
        connection.timeout = self.timeout;
        connection.server_url = self.server_url.map(Self::normalize_url);
        connection.china_auth_url = Self::normalize_url(self.china_auth_url);

        let mut auth = AuthConfig::new(username, password);
        auth.captcha_token = self.captcha_token;

        let config = Config { connection, auth };
        let region_config = region.config();

        let x_user_agent = HeaderValue::from_str(&region_config.x_user_agent())
            .map_err(|e| ClientError::Configuration(format!("invalid x-user-agent: {e}")))?;
        let mut headers = HeaderMap::new();
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static(region_config.user_agent),
        );
        headers.insert(HeaderName::from_static(X_USER_AGENT_HEADER), x_user_agent);

        let http = reqwest::Client::builder()
            .timeout(self.timeout)
            .default_headers(headers)
            .build()?;

        let mut authenticator = Authenticator::new(&config, self.credentials);
        if let Some(metrics) = self.metrics {
            authenticator = authenticator.with_metrics(metrics);
        }

        Ok(MyBmwClient {
            http,
            base_url: config.connection.server_url(),
            authenticator,
        })
    }
}
