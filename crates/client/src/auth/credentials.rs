//! Session credential storage.
//!
//! Responsibilities:
//! - Hold the access token, its expiry, the refresh token and the account id (gcid).
//! - Hold the single-use captcha token for the next full login.
//!
//! Does NOT handle:
//! - Locking (the authenticator owns the store behind a `tokio::sync::Mutex`).
//! - Token acquisition (see `flows`).
//!
//! Invariants:
//! - `install` replaces all four token fields together.
//! - The captcha token is only ever removed, never replaced.

use chrono::{DateTime, Utc};
use secrecy::SecretString;

/// Tokens returned by a successful login or refresh.
#[derive(Debug, Clone)]
pub struct TokenSet {
    pub access_token: SecretString,
    pub expires_at: DateTime<Utc>,
    pub refresh_token: SecretString,
    pub gcid: String,
}

/// Snapshot of session credentials.
///
/// Returned by [`crate::Authenticator::credentials`] so callers can store a
/// session themselves, and accepted by the client builder to resume one.
#[derive(Debug, Clone, Default)]
pub struct Credentials {
    pub access_token: Option<SecretString>,
    pub expires_at: Option<DateTime<Utc>>,
    pub refresh_token: Option<SecretString>,
    pub gcid: Option<String>,
}

impl Credentials {
    /// Resume from a refresh token only; the next request refreshes.
    pub fn from_refresh_token(refresh_token: SecretString, gcid: Option<String>) -> Self {
        Self {
            refresh_token: Some(refresh_token),
            gcid,
            ..Self::default()
        }
    }
}

#[derive(Debug, Default)]
pub(crate) struct CredentialStore {
    access_token: Option<SecretString>,
    expires_at: Option<DateTime<Utc>>,
    refresh_token: Option<SecretString>,
    gcid: Option<String>,
    captcha_token: Option<SecretString>,
}

impl CredentialStore {
    pub fn new(credentials: Credentials, captcha_token: Option<SecretString>) -> Self {
        Self {
            access_token: credentials.access_token,
            expires_at: credentials.expires_at,
            refresh_token: credentials.refresh_token,
            gcid: credentials.gcid,
            captcha_token,
        }
    }

    pub fn install(&mut self, tokens: TokenSet) {
        self.access_token = Some(tokens.access_token);
        self.expires_at = Some(tokens.expires_at);
        self.refresh_token = Some(tokens.refresh_token);
        self.gcid = Some(tokens.gcid);
    }

    /// An access token is held and not known to be expired at `now`.
    pub fn has_valid_token(&self, now: DateTime<Utc>) -> bool {
        self.access_token.is_some() && self.expires_at.is_none_or(|expires_at| expires_at > now)
    }

    pub fn access_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref()
    }

    pub fn refresh_token(&self) -> Option<&SecretString> {
        self.refresh_token.as_ref()
    }

    pub fn gcid(&self) -> Option<&str> {
        self.gcid.as_deref()
    }

    pub fn has_captcha_token(&self) -> bool {
        self.captcha_token.is_some()
    }

    pub fn take_captcha_token(&mut self) -> Option<SecretString> {
        self.captcha_token.take()
    }

    pub fn snapshot(&self) -> Credentials {
        Credentials {
            access_token: self.access_token.clone(),
            expires_at: self.expires_at,
            refresh_token: self.refresh_token.clone(),
            gcid: self.gcid.clone(),
        }
    }
}
