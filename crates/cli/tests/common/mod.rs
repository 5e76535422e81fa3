//! Shared test utilities for mybmw-cli integration tests.
//!
//! Responsibilities:
//! - Provide a hermetic CLI command factory that prevents dotenv loading.
//! - Mount a China login endpoint, the simplest flow to drive end to end.
//!
//! Invariants / Assumptions:
//! - All integration tests using this helper will be hermetic by default.
//! - `MYBMW_REGION` is `cn` and both service URLs point at the mock server.

use assert_cmd::Command;
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Returns a hermetic `mybmw-cli` command talking to `base_url`.
///
/// It ensures:
/// - `DOTENV_DISABLED=1` is set to prevent local `.env` contamination.
/// - Account settings are dummy China credentials.
/// - Other MYBMW_* vars are cleared to ensure no leakage from the host.
#[allow(dead_code)]
pub fn mybmw_cmd(base_url: &str) -> Command {
    let mut cmd = assert_cmd::cargo::cargo_bin_cmd!("mybmw-cli");

    cmd.env("DOTENV_DISABLED", "1");

    for (key, _) in std::env::vars() {
        if key.starts_with("MYBMW_") {
            cmd.env_remove(&key);
        }
    }

    cmd.env("MYBMW_REGION", "cn")
        .env("MYBMW_USERNAME", "13800000000")
        .env("MYBMW_PASSWORD", "cn-password")
        .env("MYBMW_TIMEOUT", "5")
        .env("MYBMW_SERVER_URL", base_url)
        .env("MYBMW_CHINA_AUTH_URL", base_url);

    cmd
}

/// Unsigned JWT expiring an hour from now.
#[allow(dead_code)]
pub fn access_token() -> String {
    let exp = chrono::Utc::now().timestamp() + 3600;
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(format!(r#"{{"exp":{exp}}}"#));
    format!("{header}.{payload}.signature")
}

/// Mount a successful China login on `server`.
#[allow(dead_code)]
pub async fn mount_china_login(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/api/util/login"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "code": 200,
            "data": {
                "access_token": access_token(),
                "refresh_token": "cn-refresh-token",
                "gcid": "DUMMY-GCID-CN"
            }
        })))
        .mount(server)
        .await;
}
