//! Configuration management for the MyBMW auth client.
//!
//! This crate provides the region lookup table and types and loaders for
//! account and connection configuration from environment variables.

pub mod constants;
mod loader;
pub mod types;

pub use loader::{
    ConfigError, ConfigLoader, ENV_CAPTCHA_TOKEN, ENV_CHINA_AUTH_URL, ENV_PASSWORD, ENV_REGION,
    ENV_SERVER_URL, ENV_TIMEOUT, ENV_USERNAME, env_var_or_none,
};
pub use types::{AuthConfig, Config, ConnectionConfig, Region, RegionConfig, UnknownRegion};
