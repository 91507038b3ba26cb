//! Geographic coordinates.

use geo::Point;
use serde::{Deserialize, Serialize};

/// Error returned when a latitude/longitude pair is out of range.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("invalid coordinate ({lat}, {lon}): {reason}")]
pub struct InvalidCoordinate {
    lat: f64,
    lon: f64,
    reason: &'static str,
}

/// A WGS84 latitude/longitude pair in degrees.
///
/// Used both for station positions and for the map's viewport center.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

impl LatLon {
    /// Tokyo Station, where the map opens before the user moves it.
    pub const TOKYO_STATION: LatLon = LatLon {
        lat: 35.681111,
        lon: 139.766667,
    };

    /// Create a coordinate without range checks.
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }

    /// Create a coordinate, rejecting NaN and out-of-range values.
    pub fn parse(lat: f64, lon: f64) -> Result<Self, InvalidCoordinate> {
        let invalid = |reason| InvalidCoordinate { lat, lon, reason };

        if !lat.is_finite() || !lon.is_finite() {
            return Err(invalid("must be finite"));
        }
        if !(-90.0..=90.0).contains(&lat) {
            return Err(invalid("latitude must be within [-90, 90]"));
        }
        if !(-180.0..=180.0).contains(&lon) {
            return Err(invalid("longitude must be within [-180, 180]"));
        }

        Ok(Self { lat, lon })
    }
}

impl From<LatLon> for Point<f64> {
    fn from(c: LatLon) -> Self {
        // geo uses (x, y) = (lon, lat)
        Point::new(c.lon, c.lat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_valid() {
        assert!(LatLon::parse(35.0, 139.0).is_ok());
        assert!(LatLon::parse(-90.0, -180.0).is_ok());
        assert!(LatLon::parse(90.0, 180.0).is_ok());
    }

    #[test]
    fn reject_out_of_range() {
        assert!(LatLon::parse(90.1, 0.0).is_err());
        assert!(LatLon::parse(0.0, -180.5).is_err());
        assert!(LatLon::parse(f64::NAN, 0.0).is_err());
        assert!(LatLon::parse(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn error_display() {
        let err = LatLon::parse(91.0, 0.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid coordinate (91, 0): latitude must be within [-90, 90]"
        );
    }

    #[test]
    fn point_is_lon_lat() {
        let p: Point<f64> = LatLon::new(35.0, 139.0).into();
        assert_eq!(p.x(), 139.0);
        assert_eq!(p.y(), 35.0);
    }
}
