//! Joined stations and the features derived from them.

use serde::Serialize;

use super::coord::LatLon;
use super::station::StationId;

/// A station for which both an information and a status record exist.
///
/// Derived and ephemeral: recomputed every sync cycle.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinedStation {
    pub station_id: StationId,
    pub lat: f64,
    pub lon: f64,
    pub bikes_available: u32,
}

impl JoinedStation {
    /// The station's position.
    pub fn position(&self) -> LatLon {
        LatLon::new(self.lat, self.lon)
    }
}

/// A map-agnostic point feature handed to the rendering sink.
///
/// `bikes_available` is the sole rendering attribute; the sink maps it to a
/// color through a [`ColorStops`](crate::project::ColorStops) table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderableFeature {
    pub station_id: StationId,
    pub lat: f64,
    pub lon: f64,
    pub bikes_available: u32,
}
