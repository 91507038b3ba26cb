//! Narrowing stations to those near the map's viewport center.
//!
//! Distances are great-circle (haversine) on a spherical earth. At low zoom
//! levels a 5 km radius spans enough longitude that a flat-earth shortcut
//! would visibly misplace the cutoff.

use geo::{Distance, Haversine, Point};

use crate::domain::{JoinedStation, LatLon};

/// Radius used when the caller doesn't configure one.
pub const DEFAULT_RADIUS_METERS: f64 = 5000.0;

/// Great-circle distance between two coordinates, in meters.
pub fn distance_meters(a: LatLon, b: LatLon) -> f64 {
    Haversine.distance(Point::from(a), Point::from(b))
}

/// Keep the stations within `radius_meters` of `center` (inclusive).
///
/// Input order is preserved.
pub fn filter_nearby(
    stations: &[JoinedStation],
    center: LatLon,
    radius_meters: f64,
) -> Vec<JoinedStation> {
    stations
        .iter()
        .filter(|s| distance_meters(s.position(), center) <= radius_meters)
        .cloned()
        .collect()
}
