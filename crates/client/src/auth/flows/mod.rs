//! Regional login and refresh flows.
//!
//! Each region family authenticates against a different identity provider:
//! - Rest of World / North America: OAuth2 authorization code with PKCE (`row_na`).
//! - China: a mobile login service returning JWT access tokens (`china`).
//!
//! Both expose a full login (username/password) and a refresh (refresh token).
//! A refresh rejected by the provider yields `Ok(None)` so the authenticator
//! falls back to a full login; transport failures still propagate.

mod china;
mod row_na;

use chrono::{DateTime, Utc};
use mybmw_config::Region;
use secrecy::SecretString;
use serde::Deserialize;
use tracing::debug;

use crate::auth::AuthContext;
use crate::auth::credentials::{CredentialStore, TokenSet};
use crate::error::Result;

pub use china::ChinaLoginMethod;

/// Login flow selected by region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RegionalFlow {
    RowNa,
    China(ChinaLoginMethod),
}

impl RegionalFlow {
    pub fn for_region(region: Region) -> Self {
        match region {
            Region::NorthAmerica | Region::RestOfWorld => RegionalFlow::RowNa,
            Region::China => RegionalFlow::China(ChinaLoginMethod::default()),
        }
    }

    /// Full username/password login.
    ///
    /// Takes the store to consume the single-use captcha token; token fields
    /// are not touched here.
    pub async fn login(&self, ctx: &AuthContext, store: &mut CredentialStore) -> Result<TokenSet> {
        match self {
            RegionalFlow::RowNa => row_na::login(ctx, store).await,
            RegionalFlow::China(method) => china::login(ctx, *method).await,
        }
    }

    /// Refresh login. `Ok(None)` when the provider rejected the refresh token.
    pub async fn refresh(
        &self,
        ctx: &AuthContext,
        refresh_token: &SecretString,
        gcid: Option<&str>,
    ) -> Result<Option<TokenSet>> {
        let result = match self {
            RegionalFlow::RowNa => row_na::refresh(ctx, refresh_token).await,
            RegionalFlow::China(_) => china::refresh(ctx, refresh_token, gcid).await,
        };

        match result {
            Ok(tokens) => Ok(Some(tokens)),
            Err(e) if e.is_api_error() => {
                debug!(
                    error = %e,
                    "Unable to get access token using refresh token, falling back to username/password"
                );
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

/// Deserialize secret values straight into `SecretString`.
pub(crate) mod secret_string {
    use secrecy::SecretString;
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<SecretString, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        Ok(SecretString::new(s.into()))
    }
}

/// Token endpoint response shared by the RoW/NA token call and the China refresh call.
#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(deserialize_with = "secret_string::deserialize")]
    access_token: SecretString,
    #[serde(deserialize_with = "secret_string::deserialize")]
    refresh_token: SecretString,
    expires_in: i64,
    gcid: String,
}

impl TokenResponse {
    fn into_token_set(self, issued_at: DateTime<Utc>) -> TokenSet {
        TokenSet {
            access_token: self.access_token,
            expires_at: issued_at + chrono::Duration::seconds(self.expires_in),
            refresh_token: self.refresh_token,
            gcid: self.gcid,
        }
    }
}
