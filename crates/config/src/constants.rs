//! Centralized constants for the MyBMW auth workspace.
//!
//! This module contains default values used across crates to avoid
//! magic number duplication and improve maintainability.

// =============================================================================
// Connection & Timeout Defaults
// =============================================================================

/// Default HTTP request timeout in seconds.
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Maximum allowed request timeout in seconds (10 minutes).
pub const MAX_TIMEOUT_SECS: u64 = 600;

/// Maximum number of retries for a rate-limited request phase.
pub const DEFAULT_MAX_RETRIES: usize = 3;

/// Base wait in seconds when a rate-limit response carries no usable hint.
pub const DEFAULT_RETRY_WAIT_SECS: u64 = 2;

// =============================================================================
// Identity Provider Endpoints
// =============================================================================

/// OAuth2 discovery endpoint, relative to the regional server URL.
pub const OAUTH_CONFIG_PATH: &str = "/eadrax-ucs/v1/presentation/oauth/config";

/// Default base URL of the China mobile login service.
pub const DEFAULT_CHINA_AUTH_URL: &str = "https://bmw.yixi.pro";

/// China mobile login endpoint, relative to the China auth URL.
pub const CHINA_LOGIN_PATH: &str = "/api/util/login";

/// China refresh-token endpoint, relative to the China auth URL.
pub const CHINA_REFRESH_PATH: &str = "/api/util/refresh-token";

// =============================================================================
// Client Identification
// =============================================================================

/// User agent sent by the official mobile app.
pub const USER_AGENT: &str = "Dart/3.3 (dart:io)";

/// Brand reported in the `x-user-agent` header.
pub const BRAND: &str = "bmw";

/// Device fingerprint prefix of the `x-user-agent` header.
pub const X_USER_AGENT_PREFIX: &str = "android(AP2A.240605.024)";

// =============================================================================
// Header Names
// =============================================================================

/// Header carrying the per-authenticator session id.
pub const SESSION_ID_HEADER: &str = "bmw-session-id";

/// Header carrying the client version string.
pub const X_USER_AGENT_HEADER: &str = "x-user-agent";

/// Header carrying the regional API subscription key.
pub const SUBSCRIPTION_KEY_HEADER: &str = "ocp-apim-subscription-key";

/// Header carrying the captcha token on the first authenticate call.
pub const CAPTCHA_HEADER: &str = "hcaptchatoken";
