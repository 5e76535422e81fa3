//! Configuration types for the MyBMW client.

pub mod auth;
pub mod connection;
pub mod region;

pub use auth::AuthConfig;
pub use connection::{Config, ConnectionConfig};
pub use region::{Region, RegionConfig, UnknownRegion};
