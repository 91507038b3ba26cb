//! Conversion from GBFS documents to domain records.

use chrono::DateTime;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::domain::{StationId, StationInfo, StationStatus};

use super::error::DecodeError;
use super::types::{Envelope, FeedKind, FeedMetadata, InformationStation, StatusStation};

/// A decoded feed: envelope metadata plus its station records.
#[derive(Debug, Clone)]
pub struct Decoded<T> {
    pub metadata: FeedMetadata,
    pub records: Vec<T>,
}

/// Records from either feed, tagged by kind.
#[derive(Debug, Clone, PartialEq)]
pub enum RecordList {
    Information(Vec<StationInfo>),
    Status(Vec<StationStatus>),
}

impl RecordList {
    /// Which feed the records came from.
    pub fn kind(&self) -> FeedKind {
        match self {
            RecordList::Information(_) => FeedKind::Information,
            RecordList::Status(_) => FeedKind::Status,
        }
    }

    /// Number of station records.
    pub fn len(&self) -> usize {
        match self {
            RecordList::Information(r) => r.len(),
            RecordList::Status(r) => r.len(),
        }
    }

    /// True if the feed listed no stations.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Decode a feed body of the given kind.
pub fn decode(bytes: &[u8], kind: FeedKind) -> Result<RecordList, DecodeError> {
    match kind {
        FeedKind::Information => {
            decode_information(bytes).map(|d| RecordList::Information(d.records))
        }
        FeedKind::Status => decode_status(bytes).map(|d| RecordList::Status(d.records)),
    }
}

/// Decode `station_information.json`.
pub fn decode_information(bytes: &[u8]) -> Result<Decoded<StationInfo>, DecodeError> {
    let (metadata, stations) = decode_envelope::<InformationStation>(bytes, FeedKind::Information)?;

    let records = stations
        .into_iter()
        .map(|s| StationInfo {
            station_id: StationId::new(s.station_id),
            lat: s.lat,
            lon: s.lon,
            name: s.name,
            address: s.address,
            capacity: s.capacity.or(s.vehicle_capacity),
        })
        .collect();

    Ok(Decoded { metadata, records })
}

/// Decode `station_status.json`.
pub fn decode_status(bytes: &[u8]) -> Result<Decoded<StationStatus>, DecodeError> {
    let (metadata, stations) = decode_envelope::<StatusStation>(bytes, FeedKind::Status)?;

    let records = stations
        .into_iter()
        .map(|s| StationStatus {
            station_id: StationId::new(s.station_id),
            installed: s.is_installed,
            renting: s.is_renting,
            returning: s.is_returning,
            bikes_available: s.num_bikes_available,
            docks_available: s.num_docks_available,
        })
        .collect();

    Ok(Decoded { metadata, records })
}

/// Parse the shared envelope and hand back the raw station entries.
fn decode_envelope<T: DeserializeOwned>(
    bytes: &[u8],
    kind: FeedKind,
) -> Result<(FeedMetadata, Vec<T>), DecodeError> {
    let envelope: Envelope<T> =
        serde_json::from_slice(bytes).map_err(|e| DecodeError::Malformed {
            kind,
            message: e.to_string(),
        })?;

    let last_updated =
        DateTime::from_timestamp(envelope.last_updated, 0).ok_or_else(|| {
            DecodeError::Malformed {
                kind,
                message: format!("last_updated out of range: {}", envelope.last_updated),
            }
        })?;

    let metadata = FeedMetadata {
        ttl: envelope.ttl,
        version: envelope.version,
        last_updated,
    };

    debug!(
        feed = %kind,
        version = %metadata.version,
        ttl = metadata.ttl,
        last_updated = %metadata.last_updated,
        stations = envelope.data.stations.len(),
        "decoded feed"
    );

    Ok((metadata, envelope.data.stations))
}
