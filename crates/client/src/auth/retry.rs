//! Back-off policy for rate-limited and quota-exhausted responses.
//!
//! The MyBMW API signals rate limiting with HTTP 429 or, for call-volume quota,
//! with a 403 whose body mentions "quota". Both are retried a bounded number of
//! times; the wait is derived from the `message` field of the response body.
//!
//! # Invariants
//! - Only the FIRST ASCII digit of `message` is used as the base wait in seconds
//!   ("retry after 12s" waits 2 seconds, not 24).
//! - Anything unparsable falls back to a base of `DEFAULT_RETRY_WAIT_SECS`.
//! - Retries are capped by count (`MAX_RETRIES`), not by total elapsed time.

use std::time::Duration;

use mybmw_config::constants::{DEFAULT_MAX_RETRIES, DEFAULT_RETRY_WAIT_SECS};
use reqwest::StatusCode;

/// Maximum number of retries per request phase.
pub const MAX_RETRIES: usize = DEFAULT_MAX_RETRIES;

/// Multiplier applied to the server-suggested wait.
const WAIT_MULTIPLIER: u64 = 2;

/// Check whether a response should be treated as a transient rate limit.
pub fn is_rate_limited(status: StatusCode, body: &str) -> bool {
    status == StatusCode::TOO_MANY_REQUESTS
        || (status == StatusCode::FORBIDDEN && body.to_lowercase().contains("quota"))
}

/// Compute how long to wait before resending a rate-limited request.
pub fn compute_wait(body: &str) -> Duration {
    let base = suggested_wait_secs(body).unwrap_or(DEFAULT_RETRY_WAIT_SECS);
    Duration::from_secs(base * WAIT_MULTIPLIER)
}

fn suggested_wait_secs(body: &str) -> Option<u64> {
    let json: serde_json::Value = serde_json::from_str(body).ok()?;
    json.get("message")?
        .as_str()?
        .chars()
        .find_map(|c| c.to_digit(10))
        .map(u64::from)
}
