//! Data transfer objects for web requests and responses.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::domain::LatLon;
use crate::gbfs::FeedMetadata;
use crate::project::{ColorStops, to_geojson};
use crate::sync::FeatureSet;

/// The map's viewport settled on a new center.
#[derive(Debug, Deserialize)]
pub struct ViewportRequest {
    pub lat: f64,
    pub lon: f64,
}

/// Acknowledgement of a queued map event.
#[derive(Debug, Serialize)]
pub struct AcceptedResponse {
    /// Generation published when the event was queued
    pub generation: u64,
}

/// The current station layer.
#[derive(Debug, Serialize)]
pub struct StationsResponse {
    /// Refresh that produced this data (0 = nothing loaded yet)
    pub generation: u64,

    /// Viewport center the stations were filtered around
    pub center: Option<LatLon>,

    /// Number of stations in `stations`
    pub count: usize,

    /// GeoJSON `FeatureCollection` of station points
    pub stations: Value,

    /// MapLibre expression mapping bike count to circle color
    pub circle_color: Value,

    /// Envelope metadata of the information feed
    pub information: Option<FeedMetadata>,

    /// Envelope metadata of the status feed
    pub status: Option<FeedMetadata>,
}

impl StationsResponse {
    /// Build a response from a published feature set.
    pub fn new(set: &FeatureSet, stops: &ColorStops) -> Self {
        Self {
            generation: set.generation,
            center: set.center,
            count: set.len(),
            stations: to_geojson(&set.features),
            circle_color: stops.to_expression(),
            information: set.information.clone(),
            status: set.status.clone(),
        }
    }
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{RenderableFeature, StationId};

    #[test]
    fn stations_response_from_set() {
        let set = FeatureSet {
            generation: 4,
            center: Some(LatLon::new(35.0, 139.0)),
            features: vec![RenderableFeature {
                station_id: StationId::from("A"),
                lat: 35.0,
                lon: 139.0,
                bikes_available: 3,
            }],
            information: None,
            status: None,
        };

        let response = StationsResponse::new(&set, &ColorStops::default());
        assert_eq!(response.generation, 4);
        assert_eq!(response.count, 1);
        assert_eq!(response.stations["features"][0]["properties"]["bike_available"], 3);
        assert_eq!(response.circle_color[0], "interpolate");

        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["center"]["lat"], 35.0);
        assert!(json["information"].is_null());
    }

    #[test]
    fn viewport_request_requires_both_coordinates() {
        let req: ViewportRequest = serde_json::from_str(r#"{"lat": 35.0, "lon": 139.0}"#).unwrap();
        assert_eq!(req.lon, 139.0);

        assert!(serde_json::from_str::<ViewportRequest>(r#"{"lat": 35.0}"#).is_err());
    }
}
