//! China login against the mobile login service.
//!
//! Full login posts the mobile number and password and reads the token set
//! from `data`; the expiry comes from the access token's `exp` claim.
//! Refresh posts the refresh token and gcid and reads a top-level token
//! response with `expires_in`.

use chrono::Utc;
use mybmw_config::constants::{CHINA_LOGIN_PATH, CHINA_REFRESH_PATH};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use super::{TokenResponse, secret_string};
use crate::auth::AuthContext;
use crate::auth::credentials::TokenSet;
use crate::auth::jwt;
use crate::auth::login_client::{LoginClient, read_json};
use crate::error::Result;

/// How a full China login authenticates the account.
///
/// The provider also supports an RSA-encrypted password combined with a
/// slider captcha; that variant is not offered here.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ChinaLoginMethod {
    /// Mobile number and plain password over TLS.
    #[default]
    MobilePassword,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    data: LoginData,
}

#[derive(Debug, Deserialize)]
struct LoginData {
    #[serde(deserialize_with = "secret_string::deserialize")]
    access_token: SecretString,
    #[serde(deserialize_with = "secret_string::deserialize")]
    refresh_token: SecretString,
    gcid: String,
}

fn endpoint(ctx: &AuthContext, path: &str) -> String {
    format!("{}{}", ctx.china_auth_url.trim_end_matches('/'), path)
}

pub(super) async fn login(ctx: &AuthContext, method: ChinaLoginMethod) -> Result<TokenSet> {
    debug!(?method, "Authenticating with MyBMW flow for China");
    let client = LoginClient::new(ctx)?;

    let response = match method {
        ChinaLoginMethod::MobilePassword => {
            client
                .send(client.post(&endpoint(ctx, CHINA_LOGIN_PATH)).json(
                    &serde_json::json!({
                        "mobile": ctx.username,
                        "password": ctx.password.expose_secret(),
                    }),
                ))
                .await?
        }
    };
    let LoginResponse { data } = read_json(response, "China login response").await?;
    let expires_at = jwt::expiry(data.access_token.expose_secret())?;

    Ok(TokenSet {
        access_token: data.access_token,
        expires_at,
        refresh_token: data.refresh_token,
        gcid: data.gcid,
    })
}

pub(super) async fn refresh(
    ctx: &AuthContext,
    refresh_token: &SecretString,
    gcid: Option<&str>,
) -> Result<TokenSet> {
    debug!("Authenticating with refresh token for China");
    let client = LoginClient::new(ctx)?;

    let issued_at = Utc::now();
    let response = client
        .send(client.post(&endpoint(ctx, CHINA_REFRESH_PATH)).json(
            &serde_json::json!({
                "refresh_token": refresh_token.expose_secret(),
                "gcid": gcid,
            }),
        ))
        .await?;
    let tokens: TokenResponse = read_json(response, "China refresh response").await?;

    Ok(tokens.into_token_set(issued_at))
}
