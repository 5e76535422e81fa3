//! Bearer credential injection with login, rate-limit and re-login recovery.
//!
//! Responsibilities:
//! - Ensure a valid access token before each request, logging in when needed.
//! - Inject the `authorization` and `bmw-session-id` headers (`before_send`).
//! - Classify error responses and drive retries and re-login (`after_receive`).
//!
//! Does NOT handle:
//! - Building or decoding API requests (see [`crate::client`]).
//! - Identity provider specifics (see `flows`).
//!
//! Invariants:
//! - The credential store is only mutated while its lock is held, so
//!   concurrent first requests trigger exactly one login.
//! - A login tries the refresh token first and falls back to a full login
//!   when the provider rejects it.
//! - Stored expiry is the provider expiry minus twice the request timeout.
//! - One logical request is retried at most `MAX_RETRIES` times for rate
//!   limits and re-authenticated at most once.

use std::time::Duration;

use chrono::Utc;
use mybmw_config::constants::SESSION_ID_HEADER;
use mybmw_config::{Config, RegionConfig};
use reqwest::header::{AUTHORIZATION, HeaderName, HeaderValue};
use reqwest::{Request, Response, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

use crate::auth::credentials::{CredentialStore, Credentials};
use crate::auth::flows::RegionalFlow;
use crate::auth::retry::{MAX_RETRIES, compute_wait, is_rate_limited};
use crate::error::{ClientError, ErrorOrigin, Result};
use crate::metrics::{LoginKind, MetricsCollector};

/// Immutable per-authenticator settings shared with the login flows.
#[derive(Debug, Clone)]
pub(crate) struct AuthContext {
    pub region: RegionConfig,
    pub server_url: String,
    pub china_auth_url: String,
    pub timeout: Duration,
    pub username: String,
    pub password: SecretString,
    pub session_id: String,
    pub metrics: Option<MetricsCollector>,
}

impl AuthContext {
    fn from_config(config: &Config) -> Self {
        Self {
            region: config.connection.region.config(),
            server_url: config.connection.server_url(),
            china_auth_url: config.connection.china_auth_url.clone(),
            timeout: config.connection.timeout,
            username: config.auth.username.clone(),
            password: config.auth.password.clone(),
            session_id: Uuid::new_v4().to_string(),
            metrics: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn for_tests(server_url: &str) -> Self {
        let mut config = Config {
            connection: mybmw_config::ConnectionConfig::new(mybmw_config::Region::RestOfWorld),
            auth: mybmw_config::AuthConfig::new("driver", SecretString::from("pw")),
        };
        config.connection.server_url = Some(server_url.to_string());
        config.connection.timeout = Duration::from_secs(5);
        Self::from_config(&config)
    }
}

/// Next step after a non-success response.
///
/// Only 2xx responses are returned to the caller unchanged. Anything else,
/// redirects included, is classified here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseAction {
    /// Wait, then resend the same request.
    Retry(Duration),
    /// Force a fresh login, then resend once with the new token.
    Reauthenticate,
    /// Give up and surface the response as an `API` error.
    Fail,
}

/// Authenticator for one MyBMW account.
///
/// Safe to share between tasks; all methods take `&self`.
///
/// # Example
///
/// ```rust,ignore
/// let authenticator = Authenticator::new(&config, Credentials::default());
/// let request = http.get(url).build()?;
/// let response = authenticator.authenticate(&http, request).await?;
/// ```
#[derive(Debug)]
pub struct Authenticator {
    context: AuthContext,
    flow: RegionalFlow,
    store: Mutex<CredentialStore>,
    expiry_offset: chrono::Duration,
}

impl Authenticator {
    /// Create an authenticator, optionally resuming previously saved credentials.
    pub fn new(config: &Config, credentials: Credentials) -> Self {
        let context = AuthContext::from_config(config);
        let expiry_offset = chrono::Duration::from_std(context.timeout * 2).unwrap_or_default();

        Self {
            flow: RegionalFlow::for_region(config.connection.region),
            store: Mutex::new(CredentialStore::new(
                credentials,
                config.auth.captcha_token.clone(),
            )),
            context,
            expiry_offset,
        }
    }

    /// Record login, retry and re-authentication counters.
    pub fn with_metrics(mut self, metrics: MetricsCollector) -> Self {
        self.context.metrics = Some(metrics);
        self
    }

    /// Session id sent as `bmw-session-id`, fixed for the authenticator's lifetime.
    pub fn session_id(&self) -> &str {
        &self.context.session_id
    }

    /// Snapshot of the current credentials.
    pub async fn credentials(&self) -> Credentials {
        self.store.lock().await.snapshot()
    }

    /// Force a login now, regardless of the current token.
    pub async fn login(&self) -> Result<()> {
        let mut store = self.store.lock().await;
        self.login_locked(&mut store).await
    }

    /// Send `request` with bearer credentials, recovering from rate limits and
    /// a stale token.
    ///
    /// # Errors
    ///
    /// - [`ClientError::ApiError`] when the final response is not 2xx.
    /// - [`ClientError::Configuration`] when a login needs a captcha token that
    ///   was not provided, or the request body cannot be replayed.
    /// - Login failures and transport errors propagate unchanged.
    pub async fn authenticate(
        &self,
        http: &reqwest::Client,
        mut request: Request,
    ) -> Result<Response> {
        let token = self.ensure_token().await?;
        self.before_send(&mut request, &token)?;

        let mut response = http.execute(replay(&request)?).await?;
        let mut retries = 0;
        let mut reauthenticated = false;

        loop {
            let status = response.status();
            if status.is_success() {
                return Ok(response);
            }

            let url = response.url().to_string();
            let body = response.text().await.unwrap_or_else(|e| {
                debug!(status = status.as_u16(), error = %e, "Failed to read response body");
                String::new()
            });

            response = match self.after_receive(status, &body, retries, reauthenticated) {
                ResponseAction::Retry(wait) => {
                    retries += 1;
                    debug!(
                        status = status.as_u16(),
                        attempt = retries,
                        wait_secs = wait.as_secs(),
                        "Rate limited, sleeping before retry"
                    );
                    if let Some(metrics) = &self.context.metrics {
                        metrics.record_retry("api", retries);
                    }
                    tokio::time::sleep(wait).await;
                    http.execute(replay(&request)?).await?
                }
                ResponseAction::Reauthenticate => {
                    reauthenticated = true;
                    debug!("Received unauthorized response, refreshing token");
                    if let Some(metrics) = &self.context.metrics {
                        metrics.record_reauthentication(self.context.region.region.as_str());
                    }
                    let token = {
                        let mut store = self.store.lock().await;
                        self.login_locked(&mut store).await?;
                        current_token(&store)?
                    };
                    self.before_send(&mut request, &token)?;
                    http.execute(replay(&request)?).await?
                }
                ResponseAction::Fail => {
                    let error = ClientError::from_parts(ErrorOrigin::Api, status, &url, &body);
                    if let Some(metrics) = &self.context.metrics {
                        metrics.record_client_error("api", &error);
                    }
                    return Err(error);
                }
            };
        }
    }

    /// Inject the bearer token and session id.
    pub(crate) fn before_send(&self, request: &mut Request, token: &SecretString) -> Result<()> {
        let mut authorization = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret()))
            .map_err(|_| {
                ClientError::InvalidResponse("access token is not a valid header value".to_string())
            })?;
        authorization.set_sensitive(true);

        let session_id = HeaderValue::from_str(&self.context.session_id)
            .map_err(|e| ClientError::Configuration(format!("invalid session id: {e}")))?;

        let headers = request.headers_mut();
        headers.insert(AUTHORIZATION, authorization);
        headers.insert(HeaderName::from_static(SESSION_ID_HEADER), session_id);
        Ok(())
    }

    /// Decide how to continue after a non-success response.
    ///
    /// Rate limits are retried first; a 401 (possibly after those retries)
    /// triggers one forced login. Whatever follows the re-login is final.
    pub fn after_receive(
        &self,
        status: StatusCode,
        body: &str,
        retries: usize,
        reauthenticated: bool,
    ) -> ResponseAction {
        if reauthenticated {
            ResponseAction::Fail
        } else if is_rate_limited(status, body) && retries < MAX_RETRIES {
            ResponseAction::Retry(compute_wait(body))
        } else if status == StatusCode::UNAUTHORIZED {
            ResponseAction::Reauthenticate
        } else {
            ResponseAction::Fail
        }
    }

    async fn ensure_token(&self) -> Result<SecretString> {
        let mut store = self.store.lock().await;
        if !store.has_valid_token(Utc::now()) {
            self.login_locked(&mut store).await?;
        }
        current_token(&store)
    }

    /// Obtain and install a new token set. The caller holds the store lock.
    async fn login_locked(&self, store: &mut CredentialStore) -> Result<()> {
        let region = self.context.region.region.as_str();
        let mut refreshed = None;

        if let Some(refresh_token) = store.refresh_token().cloned() {
            let gcid = store.gcid().map(str::to_owned);
            refreshed = self
                .flow
                .refresh(&self.context, &refresh_token, gcid.as_deref())
                .await?;
            if let Some(metrics) = &self.context.metrics {
                metrics.record_login(region, LoginKind::Refresh, refreshed.is_some());
            }
        }

        let mut tokens = match refreshed {
            Some(tokens) => tokens,
            None => {
                let result = self.flow.login(&self.context, store).await;
                if let Some(metrics) = &self.context.metrics {
                    metrics.record_login(region, LoginKind::Full, result.is_ok());
                    if let Err(e) = &result {
                        metrics.record_client_error("login", e);
                    }
                }
                result?
            }
        };

        tokens.expires_at = tokens.expires_at - self.expiry_offset;
        info!(
            region,
            gcid = %tokens.gcid,
            expires_at = %tokens.expires_at,
            "Obtained MyBMW access token"
        );
        store.install(tokens);
        Ok(())
    }
}

fn current_token(store: &CredentialStore) -> Result<SecretString> {
    store
        .access_token()
        .cloned()
        .ok_or_else(|| ClientError::InvalidResponse("login returned no access token".to_string()))
}

fn replay(request: &Request) -> Result<Request> {
    request.try_clone().ok_or_else(|| {
        ClientError::Configuration("request body cannot be replayed for retries".to_string())
    })
}
