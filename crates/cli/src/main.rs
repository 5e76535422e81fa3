//! MyBMW CLI - Command-line front end for the MyBMW auth client.
//!
//! Responsibilities:
//! - Parse command-line arguments and environment variables.
//! - Build a client from the layered configuration and run one command.
//! - Map failures to structured exit codes.
//!
//! Does NOT handle:
//! - Login flows or retry policy (see `crates/client`).
//! - Persisting sessions between runs; `login --show-secrets` prints the
//!   refresh token so callers can store it themselves.
//!
//! Invariants:
//! - `load_dotenv()` is called BEFORE CLI parsing to allow `.env` to provide clap defaults.
//! - Secrets are only written to stdout when `--show-secrets` is given.

mod args;
mod error;

use std::time::Duration;

use anyhow::Context;
use args::{Cli, Commands};
use clap::Parser;
use error::{ExitCode, ExitCodeExt};
use mybmw_client::{Credentials, MetricsCollector, MyBmwClient};
use mybmw_config::{Config, ConfigLoader};
use secrecy::{ExposeSecret, SecretString};
use tracing::debug;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[tokio::main]
async fn main() {
    // Load .env file BEFORE CLI parsing so clap env defaults can read .env values
    if let Err(e) = ConfigLoader::new().load_dotenv() {
        eprintln!("Failed to load environment: {}", e);
        std::process::exit(ExitCode::GeneralError.as_i32());
    }

    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = match load_config(&cli) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {:#}", e);
            std::process::exit(e.exit_code().as_i32());
        }
    };

    debug!(
        region = %config.connection.region,
        timeout_secs = config.connection.timeout.as_secs(),
        "Configuration loaded"
    );

    match run_command(cli, config).await {
        Ok(()) => std::process::exit(ExitCode::Success.as_i32()),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(e.exit_code().as_i32());
        }
    }
}

/// Layer environment variables and CLI flags into a validated config.
///
/// Precedence: CLI flags > environment (including `.env`) > defaults.
fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut loader = ConfigLoader::new().from_env()?;

    if let Some(region) = cli.region {
        loader = loader.with_region(region);
    }
    if let Some(ref username) = cli.username {
        loader = loader.with_username(username.clone());
    }
    if let Some(ref password) = cli.password {
        loader = loader.with_password(password.clone());
    }
    if let Some(ref token) = cli.captcha_token {
        loader = loader.with_captcha_token(token.clone());
    }
    if let Some(secs) = cli.timeout {
        loader = loader.with_timeout(Duration::from_secs(secs));
    }
    if let Some(ref url) = cli.server_url {
        loader = loader.with_server_url(url.clone());
    }
    if let Some(ref url) = cli.china_auth_url {
        loader = loader.with_china_auth_url(url.clone());
    }

    Ok(loader.build()?)
}

async fn run_command(cli: Cli, config: Config) -> anyhow::Result<()> {
    let credentials = match cli.refresh_token {
        Some(token) => {
            debug!("Resuming session from refresh token");
            Credentials::from_refresh_token(SecretString::from(token), cli.gcid)
        }
        None => Credentials::default(),
    };

    let client = MyBmwClient::builder()
        .from_config(&config)
        .credentials(credentials)
        .metrics(MetricsCollector::new())
        .build()?;

    match cli.command {
        Commands::Login { show_secrets } => {
            let credentials = client.login().await.context("login failed")?;
            let summary = session_summary(&credentials, show_secrets);
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Get { path } => {
            let body = client
                .get(&path)
                .await
                .with_context(|| format!("GET {path} failed"))?;
            println!("{}", serde_json::to_string_pretty(&body)?);
        }
    }

    Ok(())
}

/// JSON view of a session; tokens are masked unless `show_secrets` is set.
fn session_summary(credentials: &Credentials, show_secrets: bool) -> serde_json::Value {
    let reveal = |secret: &Option<SecretString>| {
        secret.as_ref().map(|s| {
            if show_secrets {
                s.expose_secret().to_string()
            } else {
                "***".to_string()
            }
        })
    };

    serde_json::json!({
        "gcid": credentials.gcid,
        "expires_at": credentials.expires_at.map(|t| t.to_rfc3339()),
        "access_token": reveal(&credentials.access_token),
        "refresh_token": reveal(&credentials.refresh_token),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn sample_credentials() -> Credentials {
        Credentials {
            access_token: Some(SecretString::from("access-abc")),
            expires_at: Some(Utc.with_ymd_and_hms(2026, 1, 2, 3, 4, 5).unwrap()),
            refresh_token: Some(SecretString::from("refresh-xyz")),
            gcid: Some("DUMMY-GCID".to_string()),
        }
    }

    #[test]
    fn test_session_summary_masks_tokens() {
        let summary = session_summary(&sample_credentials(), false);
        assert_eq!(summary["access_token"], "***");
        assert_eq!(summary["refresh_token"], "***");
        assert_eq!(summary["gcid"], "DUMMY-GCID");
        assert_eq!(summary["expires_at"], "2026-01-02T03:04:05+00:00");
    }

    #[test]
    fn test_session_summary_reveals_tokens_on_request() {
        let summary = session_summary(&sample_credentials(), true);
        assert_eq!(summary["access_token"], "access-abc");
        assert_eq!(summary["refresh_token"], "refresh-xyz");
    }

    #[test]
    fn test_session_summary_empty_credentials() {
        let summary = session_summary(&Credentials::default(), true);
        assert!(summary["access_token"].is_null());
        assert!(summary["expires_at"].is_null());
    }
}
