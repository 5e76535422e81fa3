//! HTTP transport for identity provider calls.
//!
//! Responsibilities:
//! - Send login and refresh requests with the mobile app's identification headers.
//! - Retry HTTP 429 responses a bounded number of times.
//! - Convert any other 4xx/5xx response into an `AUTH` error.
//!
//! Does NOT handle:
//! - Bearer token injection (login calls are unauthenticated).
//! - Following redirects: the authorization code is read from a `Location` header.
//!
//! Invariants:
//! - A rate-limited call is sent at most `MAX_RETRIES + 1` times.
//! - 3xx responses are returned to the caller unchanged.

use mybmw_config::constants::X_USER_AGENT_HEADER;
use reqwest::header::{self, HeaderMap, HeaderName, HeaderValue};
use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::auth::AuthContext;
use crate::auth::retry::{MAX_RETRIES, compute_wait};
use crate::error::{ClientError, ErrorOrigin, Result};
use crate::metrics::MetricsCollector;

pub(crate) struct LoginClient {
    http: reqwest::Client,
    base_url: String,
    metrics: Option<MetricsCollector>,
}

impl LoginClient {
    pub fn new(ctx: &AuthContext) -> Result<Self> {
        let x_user_agent = HeaderValue::from_str(&ctx.region.x_user_agent())
            .map_err(|e| ClientError::Configuration(format!("invalid x-user-agent: {e}")))?;

        let mut headers = HeaderMap::new();
        headers.insert(
            header::USER_AGENT,
            HeaderValue::from_static(ctx.region.user_agent),
        );
        headers.insert(HeaderName::from_static(X_USER_AGENT_HEADER), x_user_agent);

        let http = reqwest::Client::builder()
            .timeout(ctx.timeout)
            .default_headers(headers)
            .redirect(reqwest::redirect::Policy::none())
            .build()?;

        Ok(Self {
            http,
            base_url: ctx.server_url.clone(),
            metrics: ctx.metrics.clone(),
        })
    }

    /// Resolve a path against the regional server; absolute URLs pass through.
    pub fn url(&self, path: &str) -> String {
        if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}{}", self.base_url, path)
        }
    }

    pub fn get(&self, path: &str) -> RequestBuilder {
        self.http.get(self.url(path))
    }

    pub fn post(&self, path: &str) -> RequestBuilder {
        self.http.post(self.url(path))
    }

    /// Send a request, waiting out rate limits and rejecting error statuses.
    pub async fn send(&self, builder: RequestBuilder) -> Result<Response> {
        let request = builder.build()?;
        let mut retries = 0;

        loop {
            let attempt = request.try_clone().ok_or_else(|| {
                ClientError::Configuration("login request body cannot be replayed".to_string())
            })?;
            let response = self.http.execute(attempt).await?;
            let status = response.status();

            if status == StatusCode::TOO_MANY_REQUESTS {
                let url = response.url().to_string();
                let body = response.text().await.unwrap_or_else(|e| {
                    debug!(error = %e, "Failed to read rate limit response body");
                    String::new()
                });

                if retries >= MAX_RETRIES {
                    debug!(attempts = retries + 1, "Login rate limit retries exhausted");
                    return Err(ClientError::from_parts(
                        ErrorOrigin::Auth,
                        status,
                        &url,
                        &body,
                    ));
                }

                retries += 1;
                let wait = compute_wait(&body);
                warn!(
                    url = %url,
                    attempt = retries,
                    wait_secs = wait.as_secs(),
                    "Login rate limited (HTTP 429), waiting before retry"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.record_retry("login", retries);
                }
                tokio::time::sleep(wait).await;
                continue;
            }

            if status.is_client_error() || status.is_server_error() {
                return Err(ClientError::from_response(ErrorOrigin::Auth, response).await);
            }

            return Ok(response);
        }
    }
}

/// Decode a JSON response body, mapping shape mismatches to `InvalidResponse`.
pub(crate) async fn read_json<T: DeserializeOwned>(response: Response, what: &str) -> Result<T> {
    let body = response.text().await?;
    serde_json::from_str(&body)
        .map_err(|e| ClientError::InvalidResponse(format!("{what}: {e}")))
}

/// Value of query parameter `name` in a possibly relative URL.
pub(crate) fn query_param(url: &str, name: &str) -> Option<String> {
    let query = url.split_once('?')?.1;
    let query = query.split('#').next().unwrap_or_default();
    url::form_urlencoded::parse(query.as_bytes())
        .find(|(key, _)| key == name)
        .map(|(_, value)| value.into_owned())
}

/// Redirect target of a 3xx response, resolved against the request URL.
pub(crate) fn redirect_location(response: &Response) -> Result<String> {
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| {
            ClientError::InvalidResponse(format!(
                "expected redirect from {}, got {} without Location",
                response.url(),
                response.status()
            ))
        })?;

    response
        .url()
        .join(location)
        .map(|url| url.to_string())
        .map_err(|e| ClientError::InvalidResponse(format!("invalid Location header: {e}")))
}
