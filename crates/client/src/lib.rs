//! MyBMW API authentication client.
//!
//! This crate establishes and maintains OAuth2 session credentials for the
//! MyBMW vehicle API across the Rest of World / North America and China
//! identity providers, and injects bearer credentials into outbound requests
//! with transparent recovery from rate limits and expired tokens.

pub mod auth;
pub mod client;
pub mod error;
pub mod metrics;

pub use auth::{Authenticator, ChinaLoginMethod, Credentials, ResponseAction, TokenSet};
pub use client::MyBmwClient;
pub use client::builder::MyBmwClientBuilder;
pub use error::{ClientError, ErrorOrigin, Result};
pub use metrics::{ErrorCategory, LoginKind, MetricsCollector};
