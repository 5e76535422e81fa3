//! Rest of World / North America login: OAuth2 authorization code with PKCE.
//!
//! Full login:
//! 1. Fetch the OAuth settings from the regional server.
//! 2. POST credentials and the captcha token to the authenticate endpoint and
//!    read the `authorization` value from `redirect_to`.
//! 3. POST the authorization back and read `code` from the redirect `Location`.
//! 4. Exchange the code and PKCE verifier for tokens (HTTP basic auth).
//!
//! Refresh: fetch the OAuth settings, then POST `grant_type=refresh_token`.
//!
//! Invariants:
//! - A missing captcha token fails before any network call.
//! - The captcha token is consumed by step 2 whether or not it succeeds.

use chrono::Utc;
use mybmw_config::constants::{
    CAPTCHA_HEADER, OAUTH_CONFIG_PATH, SESSION_ID_HEADER, SUBSCRIPTION_KEY_HEADER,
};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;
use uuid::Uuid;

use super::{TokenResponse, secret_string};
use crate::auth::AuthContext;
use crate::auth::credentials::{CredentialStore, TokenSet};
use crate::auth::login_client::{LoginClient, query_param, read_json, redirect_location};
use crate::auth::pkce::PkceParams;
use crate::error::{ClientError, Result};

const CORRELATION_ID_HEADER: &str = "x-correlationid";
const BMW_CORRELATION_ID_HEADER: &str = "bmw-correlation-id";

/// OAuth settings published by the regional server.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OAuthSettings {
    token_endpoint: String,
    client_id: String,
    #[serde(deserialize_with = "secret_string::deserialize")]
    client_secret: SecretString,
    scopes: Vec<String>,
    return_url: String,
}

impl OAuthSettings {
    fn authenticate_endpoint(&self) -> String {
        self.token_endpoint.replace("/token", "/authenticate")
    }

    fn scope(&self) -> String {
        self.scopes.join(" ")
    }

    fn base_values<'a>(&'a self, pkce: &'a PkceParams, scope: &'a str) -> Vec<(&'a str, &'a str)> {
        vec![
            ("client_id", self.client_id.as_str()),
            ("response_type", "code"),
            ("scope", scope),
            ("redirect_uri", self.return_url.as_str()),
            ("state", pkce.state.as_str()),
            ("nonce", pkce.nonce.as_str()),
            ("code_challenge", pkce.challenge.as_str()),
            ("code_challenge_method", "S256"),
        ]
    }
}

#[derive(Debug, Deserialize)]
struct AuthenticateResponse {
    redirect_to: String,
}

async fn fetch_oauth_settings(client: &LoginClient, ctx: &AuthContext) -> Result<OAuthSettings> {
    let correlation_id = Uuid::new_v4().to_string();
    let response = client
        .send(
            client
                .get(OAUTH_CONFIG_PATH)
                .header(SUBSCRIPTION_KEY_HEADER, &ctx.region.subscription_key)
                .header(SESSION_ID_HEADER, &ctx.session_id)
                .header(CORRELATION_ID_HEADER, &correlation_id)
                .header(BMW_CORRELATION_ID_HEADER, &correlation_id),
        )
        .await?;
    read_json(response, "OAuth settings").await
}

pub(super) async fn login(ctx: &AuthContext, store: &mut CredentialStore) -> Result<TokenSet> {
    if !store.has_captcha_token() {
        return Err(ClientError::Configuration(
            "Missing captcha token for login (set MYBMW_CAPTCHA_TOKEN)".to_string(),
        ));
    }

    debug!(region = %ctx.region.region, "Authenticating with MyBMW flow for North America & Rest of World");
    let client = LoginClient::new(ctx)?;
    let settings = fetch_oauth_settings(&client, ctx).await?;

    let pkce = PkceParams::generate();
    let scope = settings.scope();
    let authenticate_url = settings.authenticate_endpoint();

    let captcha = store.take_captcha_token().ok_or_else(|| {
        ClientError::Configuration("Missing captcha token for login".to_string())
    })?;

    let mut credentials_form = settings.base_values(&pkce, &scope);
    credentials_form.extend([
        ("grant_type", "authorization_code"),
        ("username", ctx.username.as_str()),
        ("password", ctx.password.expose_secret()),
    ]);
    let response = client
        .send(
            client
                .post(&authenticate_url)
                .header(CAPTCHA_HEADER, captcha.expose_secret())
                .form(&credentials_form),
        )
        .await?;
    let redirect: AuthenticateResponse = read_json(response, "authenticate response").await?;
    let authorization = query_param(&redirect.redirect_to, "authorization").ok_or_else(|| {
        ClientError::InvalidResponse("redirect_to has no authorization parameter".to_string())
    })?;

    let interaction_id = Uuid::new_v4().to_string();
    let client_version = ctx.region.x_user_agent();
    let mut authorization_form = settings.base_values(&pkce, &scope);
    authorization_form.push(("authorization", authorization.as_str()));
    let response = client
        .send(
            client
                .post(&authenticate_url)
                .query(&[
                    ("interaction-id", interaction_id.as_str()),
                    ("client-version", client_version.as_str()),
                ])
                .form(&authorization_form),
        )
        .await?;
    let location = redirect_location(&response)?;
    let code = query_param(&location, "code").ok_or_else(|| {
        ClientError::InvalidResponse("authorization redirect has no code parameter".to_string())
    })?;

    let issued_at = Utc::now();
    let response = client
        .send(
            client
                .post(&settings.token_endpoint)
                .basic_auth(&settings.client_id, Some(settings.client_secret.expose_secret()))
                .form(&[
                    ("code", code.as_str()),
                    ("code_verifier", pkce.verifier.as_str()),
                    ("redirect_uri", settings.return_url.as_str()),
                    ("grant_type", "authorization_code"),
                ]),
        )
        .await?;
    let tokens: TokenResponse = read_json(response, "token response").await?;

    Ok(tokens.into_token_set(issued_at))
}

pub(super) async fn refresh(ctx: &AuthContext, refresh_token: &SecretString) -> Result<TokenSet> {
    debug!(region = %ctx.region.region, "Authenticating with refresh token for North America & Rest of World");
    let client = LoginClient::new(ctx)?;
    let settings = fetch_oauth_settings(&client, ctx).await?;
    let scope = settings.scope();

    let issued_at = Utc::now();
    let response = client
        .send(
            client
                .post(&settings.token_endpoint)
                .basic_auth(&settings.client_id, Some(settings.client_secret.expose_secret()))
                .form(&[
                    ("scope", scope.as_str()),
                    ("redirect_uri", settings.return_url.as_str()),
                    ("grant_type", "refresh_token"),
                    ("refresh_token", refresh_token.expose_secret()),
                ]),
        )
        .await?;
    let tokens: TokenResponse = read_json(response, "token response").await?;

    Ok(tokens.into_token_set(issued_at))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> OAuthSettings {
        serde_json::from_str(
            r#"{
                "tokenEndpoint": "https://customer.bmwgroup.com/gcdm/oauth/token",
                "clientId": "31c357a0-7a1d-4590-aa99-33b97244d048",
                "clientSecret": "c0e3393d-70a2-4f6f-9d3c-8530af64d552",
                "scopes": ["openid", "profile", "email", "offline_access"],
                "returnUrl": "com.bmw.connected://oauth",
                "brand": "bmw"
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_authenticate_endpoint_replaces_token_suffix() {
        assert_eq!(
            settings().authenticate_endpoint(),
            "https://customer.bmwgroup.com/gcdm/oauth/authenticate"
        );
    }

    #[test]
    fn test_base_values() {
        let settings = settings();
        let pkce = PkceParams::generate();
        let scope = settings.scope();
        let values = settings.base_values(&pkce, &scope);

        assert!(values.contains(&("scope", "openid profile email offline_access")));
        assert!(values.contains(&("response_type", "code")));
        assert!(values.contains(&("code_challenge_method", "S256")));
        assert!(values.contains(&("redirect_uri", "com.bmw.connected://oauth")));
        assert!(values.contains(&("code_challenge", pkce.challenge.as_str())));
    }

    #[test]
    fn test_settings_debug_hides_client_secret() {
        let debug_output = format!("{:?}", settings());
        assert!(!debug_output.contains("c0e3393d-70a2-4f6f-9d3c-8530af64d552"));
    }
}
