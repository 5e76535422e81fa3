//! Unverified JWT claim decoding.
//!
//! The China identity provider returns no `expires_in`; the expiry is read
//! from the access token's `exp` claim. The signature is not checked: the
//! token is only ever sent back to the server that issued it.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{ClientError, Result};

#[derive(Debug, Deserialize)]
struct Claims {
    exp: i64,
}

/// Expiry instant from the `exp` claim of a JWT.
pub fn expiry(token: &str) -> Result<DateTime<Utc>> {
    let payload = token
        .split('.')
        .nth(1)
        .ok_or_else(|| ClientError::InvalidResponse("access token is not a JWT".to_string()))?;

    let bytes = URL_SAFE_NO_PAD
        .decode(payload.trim_end_matches('='))
        .map_err(|e| ClientError::InvalidResponse(format!("invalid JWT payload encoding: {e}")))?;

    let claims: Claims = serde_json::from_slice(&bytes)
        .map_err(|e| ClientError::InvalidResponse(format!("invalid JWT claims: {e}")))?;

    DateTime::from_timestamp(claims.exp, 0)
        .ok_or_else(|| ClientError::InvalidResponse(format!("JWT exp out of range: {}", claims.exp)))
}

#[cfg(test)]
pub(crate) fn encode_unsigned(claims: &serde_json::Value) -> String {
    let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"HS256","typ":"JWT"}"#);
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    format!("{header}.{payload}.signature")
}
