//! GBFS wire types.
//!
//! These mirror the JSON documents as published. Field names follow the
//! GBFS spec (`station_id`, `num_bikes_available`, ...) and are converted to
//! domain types in `decode`.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Which of the two feeds a body, client, or error belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedKind {
    /// `station_information.json`: location and metadata
    Information,
    /// `station_status.json`: live availability
    Status,
}

impl FeedKind {
    /// The GBFS feed name.
    pub fn as_str(&self) -> &'static str {
        match self {
            FeedKind::Information => "station_information",
            FeedKind::Status => "station_status",
        }
    }
}

impl fmt::Display for FeedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Envelope metadata common to every GBFS feed.
///
/// Parsed for completeness; nothing in the sync pipeline depends on it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedMetadata {
    /// Seconds the publisher says the data stays fresh
    pub ttl: u32,
    /// GBFS version string, e.g. "2.3"
    pub version: String,
    /// When the publisher last updated the feed
    pub last_updated: DateTime<Utc>,
}

/// The outer GBFS document.
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub ttl: u32,
    pub version: String,
    pub last_updated: i64,
    pub data: StationList<T>,
}

/// The `data` object of a station feed.
#[derive(Debug, Deserialize)]
pub struct StationList<T> {
    pub stations: Vec<T>,
}

/// One entry of `station_information.json`.
#[derive(Debug, Deserialize)]
pub struct InformationStation {
    #[serde(deserialize_with = "string_or_int")]
    pub station_id: String,
    pub lat: f64,
    pub lon: f64,
    pub name: String,
    #[serde(default)]
    pub address: Option<String>,
    #[serde(default, deserialize_with = "opt_string_or_int")]
    pub capacity: Option<String>,
    /// HELLO CYCLING publishes capacity under this name instead.
    #[serde(default, deserialize_with = "opt_string_or_int")]
    pub vehicle_capacity: Option<String>,
}

/// One entry of `station_status.json`.
#[derive(Debug, Deserialize)]
pub struct StatusStation {
    #[serde(deserialize_with = "string_or_int")]
    pub station_id: String,
    #[serde(deserialize_with = "flag")]
    pub is_installed: bool,
    #[serde(deserialize_with = "flag")]
    pub is_renting: bool,
    #[serde(deserialize_with = "flag")]
    pub is_returning: bool,
    pub num_bikes_available: u32,
    pub num_docks_available: u32,
}

/// Identifiers and capacities show up as either strings or integers.
#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrInt {
    String(String),
    Int(u64),
}

impl From<StringOrInt> for String {
    fn from(v: StringOrInt) -> Self {
        match v {
            StringOrInt::String(s) => s,
            StringOrInt::Int(n) => n.to_string(),
        }
    }
}

/// GBFS 1.x publishes booleans as 0/1.
#[derive(Deserialize)]
#[serde(untagged)]
enum BoolOrInt {
    Bool(bool),
    Int(i64),
}

fn string_or_int<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    StringOrInt::deserialize(d)
        .map(String::from)
        .map_err(|_| serde::de::Error::custom("expected a string or integer"))
}

fn opt_string_or_int<'de, D: Deserializer<'de>>(d: D) -> Result<Option<String>, D::Error> {
    Option::<StringOrInt>::deserialize(d)
        .map(|v| v.map(String::from))
        .map_err(|_| serde::de::Error::custom("expected a string, integer, or null"))
}

fn flag<'de, D: Deserializer<'de>>(d: D) -> Result<bool, D::Error> {
    match BoolOrInt::deserialize(d) {
        Ok(BoolOrInt::Bool(b)) => Ok(b),
        Ok(BoolOrInt::Int(0)) => Ok(false),
        Ok(BoolOrInt::Int(1)) => Ok(true),
        Ok(BoolOrInt::Int(n)) => Err(serde::de::Error::custom(format!(
            "expected a boolean or 0/1, got {n}"
        ))),
        Err(_) => Err(serde::de::Error::custom("expected a boolean or 0/1")),
    }
}
