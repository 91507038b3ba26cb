//! Application configuration from environment variables.

use std::fmt::Display;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::domain::LatLon;
use crate::gbfs::{DEFAULT_INFORMATION_URL, DEFAULT_STATUS_URL, FeedConfig, FeedKind};
use crate::proximity::DEFAULT_RADIUS_METERS;
use crate::sync::SyncConfig;

/// Error from reading configuration.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    /// A variable was set but could not be used
    #[error("invalid {var}: {message}")]
    Invalid { var: &'static str, message: String },
}

/// Everything the binary needs to run.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// `GBFS_INFORMATION_URL`
    pub information_url: String,
    /// `GBFS_STATUS_URL`
    pub status_url: String,
    /// `STATION_RADIUS_METERS`
    pub radius_meters: f64,
    /// `FEED_TIMEOUT_SECS`
    pub feed_timeout_secs: u64,
    /// `REFRESH_INTERVAL_SECS`
    pub refresh_interval: Duration,
    /// `BIND_ADDR`
    pub bind_addr: SocketAddr,
    /// `MAP_CENTER_LAT` / `MAP_CENTER_LON`
    pub initial_center: LatLon,
}

impl AppConfig {
    /// Read configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Read configuration through `lookup`, falling back to defaults for
    /// anything unset or empty.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());

        let radius_meters: f64 = parse(&get, "STATION_RADIUS_METERS", DEFAULT_RADIUS_METERS)?;
        if !radius_meters.is_finite() || radius_meters < 0.0 {
            return Err(ConfigError::Invalid {
                var: "STATION_RADIUS_METERS",
                message: format!("must be a non-negative number, got {radius_meters}"),
            });
        }

        let refresh_secs: u64 = parse(&get, "REFRESH_INTERVAL_SECS", 60)?;
        if refresh_secs == 0 {
            return Err(ConfigError::Invalid {
                var: "REFRESH_INTERVAL_SECS",
                message: "must be at least 1".to_string(),
            });
        }

        let lat = parse(&get, "MAP_CENTER_LAT", LatLon::TOKYO_STATION.lat)?;
        let lon = parse(&get, "MAP_CENTER_LON", LatLon::TOKYO_STATION.lon)?;
        let initial_center = LatLon::parse(lat, lon).map_err(|e| ConfigError::Invalid {
            var: "MAP_CENTER_LAT",
            message: e.to_string(),
        })?;

        Ok(Self {
            information_url: get("GBFS_INFORMATION_URL")
                .unwrap_or_else(|| DEFAULT_INFORMATION_URL.to_string()),
            status_url: get("GBFS_STATUS_URL").unwrap_or_else(|| DEFAULT_STATUS_URL.to_string()),
            radius_meters,
            feed_timeout_secs: parse(&get, "FEED_TIMEOUT_SECS", 30)?,
            refresh_interval: Duration::from_secs(refresh_secs),
            bind_addr: parse(&get, "BIND_ADDR", SocketAddr::from(([127, 0, 0, 1], 3000)))?,
            initial_center,
        })
    }

    /// Client configuration for the station information feed.
    pub fn information_feed(&self) -> FeedConfig {
        FeedConfig::new(FeedKind::Information, &self.information_url)
            .with_timeout(self.feed_timeout_secs)
    }

    /// Client configuration for the station status feed.
    pub fn status_feed(&self) -> FeedConfig {
        FeedConfig::new(FeedKind::Status, &self.status_url).with_timeout(self.feed_timeout_secs)
    }

    /// Pipeline configuration.
    pub fn sync_config(&self) -> SyncConfig {
        SyncConfig::default().with_radius(self.radius_meters)
    }
}

fn parse<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    match get(var) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e| ConfigError::Invalid {
            var,
            message: format!("{e} (got {raw:?})"),
        }),
    }
}
