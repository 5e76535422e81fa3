//! PKCE verifier/challenge and random opaque tokens.

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use sha2::{Digest, Sha256};

/// RFC 3986 unreserved characters.
const UNRESERVED: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

const VERIFIER_LEN: usize = 86;
const STATE_LEN: usize = 22;

/// Random token of `len` unreserved characters.
pub fn generate_token(len: usize) -> String {
    (0..len)
        .map(|_| char::from(UNRESERVED[rand::random_range(0..UNRESERVED.len())]))
        .collect()
}

/// S256 code challenge: unpadded base64url of the SHA-256 of the verifier.
pub fn code_challenge(verifier: &str) -> String {
    URL_SAFE_NO_PAD.encode(Sha256::digest(verifier.as_bytes()))
}

/// Per-attempt PKCE values.
#[derive(Debug, Clone)]
pub struct PkceParams {
    pub verifier: String,
    pub challenge: String,
    pub state: String,
    pub nonce: String,
}

impl PkceParams {
    pub fn generate() -> Self {
        let verifier = generate_token(VERIFIER_LEN);
        let challenge = code_challenge(&verifier);
        Self {
            verifier,
            challenge,
            state: generate_token(STATE_LEN),
            nonce: generate_token(STATE_LEN),
        }
    }
}
