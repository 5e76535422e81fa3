//! Metrics collection for authentication and request recovery.
//!
//! This module records counters for:
//! - Logins, split by flow (full / refresh) and outcome
//! - Rate-limit retries, split by phase (login / api)
//! - Forced re-authentications after a 401
//! - Terminal errors, by category
//!
//! # What this module does NOT handle:
//! - Metrics exposition/export (install a recorder such as a Prometheus exporter)
//! - Request latency of the vehicle API itself
//!
//! # Invariants
//! - All metrics use consistent label names: `region`, `flow`, `outcome`, `phase`, `error_category`
//! - Metric recording is infallible and never disrupts a request
//! - Zero-cost when no metrics recorder is installed

use crate::error::ClientError;

/// Metric name for login counter.
pub const METRIC_LOGINS_TOTAL: &str = "mybmw_auth_logins_total";

/// Metric name for rate-limit retry counter.
pub const METRIC_RETRIES_TOTAL: &str = "mybmw_auth_retries_total";

/// Metric name for forced re-authentication counter.
pub const METRIC_REAUTHENTICATIONS_TOTAL: &str = "mybmw_auth_reauthentications_total";

/// Metric name for error counter.
pub const METRIC_ERRORS_TOTAL: &str = "mybmw_auth_errors_total";

/// Error categories for metrics labeling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Missing captcha or other local configuration problem
    Configuration,
    /// Rejected credentials (401)
    Unauthorized,
    /// Rate limit or quota exhausted (403/429)
    Quota,
    /// Other HTTP 4xx client errors
    Http4xx,
    /// HTTP 5xx server errors
    Http5xx,
    /// Transport-level errors (connection refused, DNS, timeout)
    Transport,
    /// Unexpected response shape
    InvalidResponse,
}

impl ErrorCategory {
    /// Returns the string label for this error category.
    pub const fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Configuration => "configuration",
            ErrorCategory::Unauthorized => "unauthorized",
            ErrorCategory::Quota => "quota",
            ErrorCategory::Http4xx => "http_4xx",
            ErrorCategory::Http5xx => "http_5xx",
            ErrorCategory::Transport => "transport",
            ErrorCategory::InvalidResponse => "invalid_response",
        }
    }
}

impl From<&ClientError> for ErrorCategory {
    fn from(error: &ClientError) -> Self {
        match error {
            ClientError::Configuration(_) => ErrorCategory::Configuration,
            ClientError::ApiError { status: 401, .. } => ErrorCategory::Unauthorized,
            ClientError::ApiError {
                status: 403 | 429, ..
            } => ErrorCategory::Quota,
            ClientError::ApiError { status, .. } if (500..600).contains(status) => {
                ErrorCategory::Http5xx
            }
            ClientError::ApiError { .. } => ErrorCategory::Http4xx,
            ClientError::HttpError(_) => ErrorCategory::Transport,
            ClientError::InvalidResponse(_) => ErrorCategory::InvalidResponse,
        }
    }
}

/// Which kind of login produced a token set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginKind {
    Full,
    Refresh,
}

impl LoginKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            LoginKind::Full => "full",
            LoginKind::Refresh => "refresh",
        }
    }
}

/// Metrics collector for the authenticator.
///
/// A lightweight wrapper around the `metrics` crate macros with consistent labels.
///
/// # Example
///
/// ```rust,ignore
/// use mybmw_client::{MetricsCollector, MyBmwClient};
///
/// let client = MyBmwClient::builder()
///     .from_config(&config)
///     .metrics(MetricsCollector::new())
///     .build()?;
/// ```
#[derive(Debug, Clone, Default)]
pub struct MetricsCollector {
    /// Whether metrics collection is enabled.
    enabled: bool,
}

impl MetricsCollector {
    /// Create a new, enabled metrics collector.
    pub fn new() -> Self {
        Self { enabled: true }
    }

    /// Create a disabled metrics collector.
    pub fn disabled() -> Self {
        Self { enabled: false }
    }

    /// Check if metrics collection is enabled.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Record a login attempt and whether it produced a token set.
    pub fn record_login(&self, region: &str, kind: LoginKind, success: bool) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_LOGINS_TOTAL,
            "region" => region.to_string(),
            "flow" => kind.as_str(),
            "outcome" => if success { "success" } else { "failure" },
        )
        .increment(1);
    }

    /// Record a rate-limit retry.
    ///
    /// # Arguments
    /// * `phase` - `"login"` for identity provider calls, `"api"` for authenticated calls
    /// * `attempt` - The retry attempt number (1-based)
    pub fn record_retry(&self, phase: &'static str, attempt: usize) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_RETRIES_TOTAL,
            "phase" => phase,
            "attempt" => attempt.to_string(),
        )
        .increment(1);
    }

    /// Record a forced re-login after an unauthorized response.
    pub fn record_reauthentication(&self, region: &str) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_REAUTHENTICATIONS_TOTAL,
            "region" => region.to_string(),
        )
        .increment(1);
    }

    /// Record a terminal error, categorized automatically.
    pub fn record_client_error(&self, phase: &'static str, error: &ClientError) {
        if !self.enabled {
            return;
        }

        metrics::counter!(METRIC_ERRORS_TOTAL,
            "phase" => phase,
            "error_category" => ErrorCategory::from(error).as_str(),
        )
        .increment(1);
    }
}
