//! Common test utilities for integration tests.
//!
//! This module provides fixtures, client constructors and identity provider
//! mocks shared by the integration tests. All tests run against a wiremock
//! server standing in for both the regional API server and the identity
//! providers.
//!
//! # Invariants
//! - Fixtures are loaded from the `fixtures/` directory relative to the crate root
//! - Rate-limit bodies used in tests carry a `0` wait so no clock control is needed
//!
//! # What this does NOT handle
//! - Test-specific assertions or test logic

use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use mybmw_client::MyBmwClient;
use mybmw_config::Region;
use secrecy::SecretString;
use wiremock::matchers::{body_string_contains, method, path};

#[allow(unused_imports)]
pub use wiremock::{Mock, MockServer, ResponseTemplate};

/// Path of the API endpoint used by most tests.
#[allow(dead_code)]
pub const VEHICLES_PATH: &str = "/eadrax-vcs/v5/vehicle-list";

/// Request timeout used by test clients; stored expiry is offset by twice this.
#[allow(dead_code)]
pub const TEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Load a JSON fixture from `fixtures/`.
#[allow(dead_code)]
pub fn load_fixture(fixture_path: &str) -> serde_json::Value {
    let manifest_dir = Path::new(env!("CARGO_MANIFEST_DIR"));
    let full_path = manifest_dir.join("fixtures").join(fixture_path);
    let content = std::fs::read_to_string(&full_path)
        .unwrap_or_else(|_| panic!("Failed to load fixture: {}", full_path.display()));
    serde_json::from_str(&content).expect("Invalid JSON in fixture")
}

/// Unsigned JWT whose `exp` claim is `exp`.
#[allow(dead_code)]
pub fn jwt_with_exp(exp: i64) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(serde_json::json!({"exp": exp, "sub": "gcid"}).to_string());
    format!("{header}.{payload}.signature")
}

/// Number of requests the server received for `request_path`.
#[allow(dead_code)]
pub async fn request_count(server: &MockServer, request_path: &str) -> usize {
    server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == request_path)
        .count()
}

/// China client pointing both the API and the login service at `server`.
#[allow(dead_code)]
pub fn china_client(server: &MockServer) -> MyBmwClient {
    MyBmwClient::builder()
        .region(Region::China)
        .username("13800000000".to_string())
        .password(SecretString::from("cn-password"))
        .server_url(server.uri())
        .china_auth_url(server.uri())
        .timeout(TEST_TIMEOUT)
        .build()
        .unwrap()
}

/// Rest of World client with an optional captcha token.
#[allow(dead_code)]
pub fn row_client(server: &MockServer, captcha: Option<&str>) -> MyBmwClient {
    let mut builder = MyBmwClient::builder()
        .region(Region::RestOfWorld)
        .username("driver@example.com".to_string())
        .password(SecretString::from("row-password"))
        .server_url(server.uri())
        .timeout(TEST_TIMEOUT);
    if let Some(captcha) = captcha {
        builder = builder.captcha_token(SecretString::from(captcha));
    }
    builder.build().unwrap()
}

/// Mount a China login endpoint handing out `access_token`; returns a call counter.
#[allow(dead_code)]
pub async fn mount_china_login(server: &MockServer, access_token: String) -> Arc<AtomicUsize> {
    let count = Arc::new(AtomicUsize::new(0));
    let count_clone = count.clone();

    Mock::given(method("POST"))
        .and(path("/api/util/login"))
        .and(body_string_contains("13800000000"))
        .respond_with(move |_: &wiremock::Request| {
            count_clone.fetch_add(1, Ordering::SeqCst);
            ResponseTemplate::new(200)
                .set_body_json(serde_json::json!({
                    "code": 200,
                    "data": {
                        "access_token": access_token,
                        "refresh_token": "cn-refresh-token",
                        "gcid": "DUMMY-GCID-CN"
                    }
                }))
                .set_delay(Duration::from_millis(100))
        })
        .mount(server)
        .await;

    count
}

/// Mount the full Rest of World PKCE login against `server`.
///
/// The OAuth settings point the token endpoint at `server`; the token
/// response is the `row/token_response.json` fixture.
#[allow(dead_code)]
pub async fn mount_row_login(server: &MockServer) {
    let mut settings = load_fixture("row/oauth_config.json");
    settings["tokenEndpoint"] = serde_json::json!(format!("{}/gcdm/oauth/token", server.uri()));

    Mock::given(method("GET"))
        .and(path("/eadrax-ucs/v1/presentation/oauth/config"))
        .respond_with(ResponseTemplate::new(200).set_body_json(settings))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/gcdm/oauth/authenticate"))
        .and(body_string_contains("username=driver%40example.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "redirect_to": "com.bmw.connected://oauth?authorization=AUTHZ-123&state=s"
        })))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/gcdm/oauth/authenticate"))
        .and(body_string_contains("authorization=AUTHZ-123"))
        .respond_with(ResponseTemplate::new(302).insert_header(
            "location",
            "com.bmw.connected://oauth?code=CODE-456&state=s&client_id=31c357a0",
        ))
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/gcdm/oauth/token"))
        .and(body_string_contains("code=CODE-456"))
        .respond_with(ResponseTemplate::new(200).set_body_json(load_fixture("row/token_response.json")))
        .mount(server)
        .await;
}
