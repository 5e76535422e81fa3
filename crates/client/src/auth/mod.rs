//! Authentication state machine for the MyBMW API.
//!
//! Responsibilities:
//! - Hold the session credentials of one account (`credentials`).
//! - Run the regional login and refresh flows (`flows`).
//! - Inject bearer credentials into outbound requests and recover from
//!   rate limits and stale tokens (`authenticator`).
//!
//! Does NOT handle:
//! - Building API requests or decoding API payloads (see [`crate::client`]).
//! - Persisting credentials between processes (callers use [`Credentials`]).
//!
//! Invariants:
//! - At most one login or refresh runs per [`Authenticator`] at any time.
//! - Token fields are replaced together or not at all.

mod authenticator;
mod credentials;
mod flows;
mod jwt;
mod login_client;
mod pkce;
pub mod retry;

pub use authenticator::{Authenticator, ResponseAction};
pub use credentials::{Credentials, TokenSet};
pub use flows::ChinaLoginMethod;

pub(crate) use authenticator::AuthContext;
