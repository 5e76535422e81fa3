//! Authenticated MyBMW API client.
//!
//! This module provides [`MyBmwClient`], a thin HTTP client whose every
//! request goes through an [`Authenticator`]: bearer credentials are injected,
//! logins happen on demand, and rate limits and stale tokens are recovered
//! from transparently.
//!
//! # Submodules
//! - [`builder`]: Client construction and configuration
//!
//! # What this module does NOT handle:
//! - Vehicle API models (callers decode the returned JSON themselves)
//! - Login flows and retry policy (delegated to [`crate::auth`])
//!
//! # Invariants
//! - Request paths are joined onto the regional server URL, which has no trailing slash
//! - Error responses surface as [`ClientError::ApiError`] with origin `API`

pub mod builder;

use reqwest::{Method, RequestBuilder, Response};
use serde::Serialize;

use crate::auth::{Authenticator, Credentials};
use crate::error::{ClientError, Result};

/// MyBMW API client.
///
/// # Creating a Client
///
/// ```rust,ignore
/// use mybmw_client::MyBmwClient;
/// use mybmw_config::ConfigLoader;
///
/// let config = ConfigLoader::new().load_dotenv()?.from_env()?.build()?;
/// let client = MyBmwClient::builder().from_config(&config).build()?;
/// let vehicles = client.get("/eadrax-vcs/v5/vehicle-list").await?;
/// ```
#[derive(Debug)]
pub struct MyBmwClient {
    pub(crate) http: reqwest::Client,
    pub(crate) base_url: String,
    pub(crate) authenticator: Authenticator,
}

impl MyBmwClient {
    /// Create a new client builder.
    pub fn builder() -> builder::MyBmwClientBuilder {
        builder::MyBmwClientBuilder::new()
    }

    /// Get the regional server URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The authenticator shared by every request of this client.
    pub fn authenticator(&self) -> &Authenticator {
        &self.authenticator
    }

    /// Start a request to `path` on the regional server.
    ///
    /// Absolute URLs are used as given.
    pub fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = if path.starts_with("http://") || path.starts_with("https://") {
            path.to_string()
        } else {
            format!("{}/{}", self.base_url, path.trim_start_matches('/'))
        };
        self.http.request(method, url)
    }

    /// Send a request through the authenticator.
    pub async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let request = request.build()?;
        self.authenticator.authenticate(&self.http, request).await
    }

    /// GET `path` and decode the JSON body.
    pub async fn get(&self, path: &str) -> Result<serde_json::Value> {
        let response = self.send(self.request(Method::GET, path)).await?;
        decode_json(response).await
    }

    /// POST a JSON body to `path` and decode the JSON response.
    pub async fn post_json<B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<serde_json::Value> {
        let response = self
            .send(self.request(Method::POST, path).json(body))
            .await?;
        decode_json(response).await
    }

    /// Log in now and return the resulting credentials.
    pub async fn login(&self) -> Result<Credentials> {
        self.authenticator.login().await?;
        Ok(self.authenticator.credentials().await)
    }

    /// Snapshot of the current credentials.
    pub async fn credentials(&self) -> Credentials {
        self.authenticator.credentials().await
    }
}

/// Decode a JSON body; an empty body decodes to `null`.
async fn decode_json(response: Response) -> Result<serde_json::Value> {
    let url = response.url().to_string();
    let body = response.text().await?;
    if body.trim().is_empty() {
        return Ok(serde_json::Value::Null);
    }
    serde_json::from_str(&body)
        .map_err(|e| ClientError::InvalidResponse(format!("{url}: invalid JSON: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use mybmw_config::Region;
    use secrecy::SecretString;

    fn client() -> MyBmwClient {
        MyBmwClient::builder()
            .region(Region::RestOfWorld)
            .username("driver@example.com".to_string())
            .password(SecretString::from("pw"))
            .server_url("http://127.0.0.1:9000/".to_string())
            .build()
            .unwrap()
    }

    #[test]
    fn test_request_joins_path() {
        let request = client()
            .request(Method::GET, "/eadrax-vcs/v5/vehicle-list")
            .build()
            .unwrap();
        assert_eq!(
            request.url().as_str(),
            "http://127.0.0.1:9000/eadrax-vcs/v5/vehicle-list"
        );
    }

    #[test]
    fn test_request_without_leading_slash() {
        let request = client().request(Method::GET, "vehicles").build().unwrap();
        assert_eq!(request.url().as_str(), "http://127.0.0.1:9000/vehicles");
    }

    #[test]
    fn test_request_absolute_url() {
        let request = client()
            .request(Method::POST, "https://example.com/other")
            .build()
            .unwrap();
        assert_eq!(request.url().as_str(), "https://example.com/other");
    }
}
