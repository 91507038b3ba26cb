//! Station identifiers and the per-station feed records.

use std::fmt;

use serde::Serialize;

/// Stable identifier joining a station's metadata to its live status.
///
/// Feeds publish this as a string; numeric ids are normalised to their
/// decimal form by the decoder before they get here.
///
/// # Examples
///
/// ```
/// use station_map::domain::StationId;
///
/// let id = StationId::new("00012345");
/// assert_eq!(id.as_str(), "00012345");
/// ```
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct StationId(String);

impl StationId {
    /// Wrap a raw identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "StationId({})", self.0)
    }
}

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for StationId {
    fn from(s: &str) -> Self {
        Self::new(s)
    }
}

/// Static metadata for one physical station (station information feed).
#[derive(Debug, Clone, PartialEq)]
pub struct StationInfo {
    pub station_id: StationId,
    pub lat: f64,
    pub lon: f64,
    pub name: String,
    pub address: Option<String>,
    /// Dock capacity as published; some feeds send a number, some a string.
    pub capacity: Option<String>,
}

/// Live availability for one station (station status feed).
///
/// May be stale relative to [`StationInfo`]: the two feeds are fetched
/// independently and are not transactionally consistent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationStatus {
    pub station_id: StationId,
    pub installed: bool,
    pub renting: bool,
    pub returning: bool,
    pub bikes_available: u32,
    pub docks_available: u32,
}
