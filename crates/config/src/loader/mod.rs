//! Configuration loader for `.env` files and environment variables.
//!
//! Responsibilities:
//! - Load configuration from `.env` files and `MYBMW_*` environment variables.
//! - Provide a builder-pattern `ConfigLoader` for layered configuration merging.
//! - Enforce `DOTENV_DISABLED` gate to prevent accidental dotenv loading in tests.
//!
//! Invariants / Assumptions:
//! - Builder overrides applied after `from_env()` win over environment values.
//! - `load_dotenv()` must be called explicitly to enable `.env` file loading.

mod builder;
mod env;
mod error;

#[cfg(test)]
mod tests;

pub use builder::ConfigLoader;
pub use env::{
    ENV_CAPTCHA_TOKEN, ENV_CHINA_AUTH_URL, ENV_PASSWORD, ENV_REGION, ENV_SERVER_URL,
    ENV_TIMEOUT, ENV_USERNAME, env_var_or_none,
};
pub use error::ConfigError;
