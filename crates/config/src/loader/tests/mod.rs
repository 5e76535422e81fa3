//! Tests for the configuration loader builder.
//!
//! Responsibilities:
//! - Test environment variable handling and precedence.
//! - Test validation of timeouts, URLs, regions and required credentials.
//!
//! Invariants:
//! - Tests touching the environment use `serial_test` and `global_test_lock()`.
//! - Environment mutations are scoped with `temp_env`.

use std::sync::Mutex;


/// Returns the global test lock for environment variable isolation.
pub fn env_lock() -> &'static Mutex<()> {
    crate::test_util::global_test_lock()
}

/// All variables read by `from_env()`, unset, for a clean baseline.
pub fn cleared_env() -> Vec<(&'static str, Option<&'static str>)> {
    vec![
        ("MYBMW_USERNAME", None),
        ("MYBMW_PASSWORD", None),
        ("MYBMW_REGION", None),
        ("MYBMW_CAPTCHA_TOKEN", None),
        ("MYBMW_TIMEOUT", None),
        ("MYBMW_SERVER_URL", None),
        ("MYBMW_CHINA_AUTH_URL", None),
    ]
}
