//! Error types for the MyBMW client.

use std::fmt;

use reqwest::StatusCode;
use thiserror::Error;

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;

/// Which side of the client produced an API error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorOrigin {
    /// Login and refresh calls against the identity provider.
    Auth,
    /// Authenticated calls against the vehicle API.
    Api,
}

impl ErrorOrigin {
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorOrigin::Auth => "AUTH",
            ErrorOrigin::Api => "API",
        }
    }
}

impl fmt::Display for ErrorOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors that can occur during MyBMW client operations.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Fatal configuration problem, never retried (e.g. missing captcha token).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Terminal non-2xx response after the retry and re-login policy ran out.
    #[error("{origin} error ({status}) at {url}: {message}")]
    ApiError {
        origin: ErrorOrigin,
        status: u16,
        url: String,
        message: String,
    },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Response did not have the expected shape.
    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl ClientError {
    /// Build an API error from an already-read response.
    ///
    /// The message is `"{error} - {error_description}"` when the body is a JSON
    /// object carrying an `error` field, otherwise the raw body text.
    pub fn from_parts(origin: ErrorOrigin, status: StatusCode, url: &str, body: &str) -> Self {
        let message = serde_json::from_str::<serde_json::Value>(body)
            .ok()
            .and_then(|json| {
                let error = json.get("error")?.as_str()?.to_string();
                let description = json
                    .get("error_description")
                    .and_then(|d| d.as_str())
                    .unwrap_or_default();
                Some(format!("{error} - {description}"))
            })
            .unwrap_or_else(|| {
                if body.is_empty() {
                    status.canonical_reason().unwrap_or("unknown").to_string()
                } else {
                    body.to_string()
                }
            });

        tracing::error!(
            origin = origin.as_str(),
            status = status.as_u16(),
            url,
            "{origin} error: {message}"
        );

        Self::ApiError {
            origin,
            status: status.as_u16(),
            url: url.to_string(),
            message,
        }
    }

    /// Consume a response and convert it into an API error.
    pub async fn from_response(origin: ErrorOrigin, response: reqwest::Response) -> Self {
        let status = response.status();
        let url = response.url().to_string();
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "Could not read error response body".to_string());
        Self::from_parts(origin, status, &url, &body)
    }

    /// HTTP status of an API error.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::ApiError { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Check if this error is a terminal API error.
    pub fn is_api_error(&self) -> bool {
        matches!(self, Self::ApiError { .. })
    }

    /// Check if this error indicates rejected credentials (401).
    pub fn is_auth_error(&self) -> bool {
        self.status() == Some(401)
    }

    /// Check if this error indicates rate limiting or quota exhaustion (403/429).
    pub fn is_quota_error(&self) -> bool {
        matches!(self.status(), Some(403 | 429))
    }

    pub fn is_configuration_error(&self) -> bool {
        matches!(self, Self::Configuration(_))
    }
}
