//! CLI argument definitions and parsing.
//!
//! Responsibilities:
//! - Define the CLI structure using clap derive macros.
//! - Parse command-line arguments and environment variables.
//!
//! Non-responsibilities:
//! - Does not execute commands (see `main`).
//! - Does not validate configuration (see `mybmw_config::ConfigLoader`).

use clap::{Parser, Subcommand};
use mybmw_config::Region;

#[derive(Parser)]
#[command(name = "mybmw-cli")]
#[command(about = "MyBMW CLI - Log in to the MyBMW API and issue authenticated requests", long_about = None)]
#[command(version)]
#[command(
    after_help = "Examples:\n  mybmw-cli --region row --captcha-token P1_... login\n  mybmw-cli --region cn login --show-secrets\n  mybmw-cli --refresh-token $MYBMW_REFRESH_TOKEN get /eadrax-vcs/v5/vehicle-list\n"
)]
pub struct Cli {
    /// Account region (na, row, cn)
    #[arg(short, long, global = true, env = "MYBMW_REGION", value_parser = parse_region)]
    pub region: Option<Region>,

    /// Account username (e-mail, or mobile number in China)
    #[arg(short, long, global = true, env = "MYBMW_USERNAME")]
    pub username: Option<String>,

    /// Account password
    #[arg(short, long, global = true, env = "MYBMW_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// hCaptcha token for a full Rest of World / North America login
    #[arg(long, global = true, env = "MYBMW_CAPTCHA_TOKEN", hide_env_values = true)]
    pub captcha_token: Option<String>,

    /// Refresh token from a previous session; skips the captcha when still valid
    #[arg(long, global = true, env = "MYBMW_REFRESH_TOKEN", hide_env_values = true)]
    pub refresh_token: Option<String>,

    /// GCID accompanying the refresh token
    #[arg(long, global = true, env = "MYBMW_GCID")]
    pub gcid: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "MYBMW_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Override the regional API server URL
    #[arg(long, global = true, env = "MYBMW_SERVER_URL")]
    pub server_url: Option<String>,

    /// Override the China login service URL
    #[arg(long, global = true, env = "MYBMW_CHINA_AUTH_URL")]
    pub china_auth_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Log in and print the resulting session as JSON
    Login {
        /// Include the access and refresh tokens in the output
        #[arg(long)]
        show_secrets: bool,
    },

    /// Send an authenticated GET request and print the JSON response
    Get {
        /// API path, e.g. /eadrax-vcs/v5/vehicle-list
        path: String,
    },
}

fn parse_region(value: &str) -> Result<Region, String> {
    value.parse::<Region>().map_err(|e| e.to_string())
}
