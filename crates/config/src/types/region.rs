//! Region identifiers and the region lookup table.
//!
//! Responsibilities:
//! - Define the closed set of supported regions.
//! - Map a region to its server URL, subscription key, app version and user agents.
//!
//! Does NOT handle:
//! - Selecting a login flow for a region (see the client crate).
//!
//! Invariants:
//! - The lookup is pure: the same region always yields the same values.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::constants::{BRAND, USER_AGENT, X_USER_AGENT_PREFIX};

/// Regions served by separate identity providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Region {
    #[serde(rename = "na")]
    NorthAmerica,
    #[serde(rename = "row")]
    RestOfWorld,
    #[serde(rename = "cn")]
    China,
}

impl Region {
    /// All supported regions.
    pub const ALL: [Region; 3] = [Region::NorthAmerica, Region::RestOfWorld, Region::China];

    /// Short identifier used in headers and configuration.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Region::NorthAmerica => "na",
            Region::RestOfWorld => "row",
            Region::China => "cn",
        }
    }

    /// Lookup the static connection settings for this region.
    pub fn config(&self) -> RegionConfig {
        RegionConfig::for_region(*self)
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when a region string is not recognized.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown region '{0}' (expected one of: na, row, cn)")]
pub struct UnknownRegion(pub String);

impl FromStr for Region {
    type Err = UnknownRegion;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "na" | "north_america" | "northamerica" => Ok(Region::NorthAmerica),
            "row" | "rest_of_world" | "restofworld" => Ok(Region::RestOfWorld),
            "cn" | "china" => Ok(Region::China),
            other => Err(UnknownRegion(other.to_string())),
        }
    }
}

/// Static connection settings for one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegionConfig {
    pub region: Region,
    pub server_url: String,
    pub subscription_key: String,
    pub app_version: &'static str,
    pub user_agent: &'static str,
}

impl RegionConfig {
    pub fn for_region(region: Region) -> Self {
        let (host, encoded_key) = match region {
            Region::NorthAmerica => (
                "cocoapi.bmwgroup.us",
                "MzFlMTAyZjUtNmY3ZS03ZWYzLTkwNDQtZGRjZTYzODkxMzYy",
            ),
            Region::RestOfWorld => (
                "cocoapi.bmwgroup.com",
                "NGYxYzg1YTMtNzU4Zi1hMzdkLWJiYjYtZjg3MDQ0OTRhY2Zh",
            ),
            Region::China => (
                "myprofile.bmw.com.cn",
                "NDU0NmI3MmUtYjJhOC00OTZjLWI1ZTYtM2M1MzFiN2MyZDIx",
            ),
        };

        Self {
            region,
            server_url: format!("https://{host}"),
            subscription_key: decode_key(encoded_key),
            app_version: "4.9.2(36892)",
            user_agent: USER_AGENT,
        }
    }

    /// Value of the `x-user-agent` header, also sent as `client-version`.
    pub fn x_user_agent(&self) -> String {
        format!(
            "{X_USER_AGENT_PREFIX};{BRAND};{};{}",
            self.app_version,
            self.region.as_str()
        )
    }
}

fn decode_key(encoded: &str) -> String {
    STANDARD
        .decode(encoded)
        .ok()
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_default()
}
