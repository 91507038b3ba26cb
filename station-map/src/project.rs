//! Projection of joined stations into renderable point features.
//!
//! The rendering sink receives features plus a [`ColorStops`] table keyed on
//! the bike count. Markers are drawn as circles colored by that table and
//! labelled with the count itself.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::{Value, json};

use crate::domain::{JoinedStation, RenderableFeature};

/// Feature property the map layers read the bike count from.
pub const BIKES_PROPERTY: &str = "bike_available";

/// Turn joined stations into features, one-to-one and in order.
pub fn project(stations: &[JoinedStation]) -> Vec<RenderableFeature> {
    stations
        .iter()
        .map(|s| RenderableFeature {
            station_id: s.station_id.clone(),
            lat: s.lat,
            lon: s.lon,
            bikes_available: s.bikes_available,
        })
        .collect()
}

/// An sRGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const RED: Color = Color::rgb(0xff, 0x00, 0x00);
    pub const YELLOW: Color = Color::rgb(0xff, 0xff, 0x00);
    pub const GREEN: Color = Color::rgb(0x00, 0xff, 0x00);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl fmt::Display for Color {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

impl Serialize for Color {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Bike-count thresholds and the marker color from each threshold upward.
///
/// Stops are kept sorted by threshold.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorStops {
    stops: Vec<(u32, Color)>,
}

impl ColorStops {
    /// Build a table from `(threshold, color)` pairs in any order.
    ///
    /// A later pair with the same threshold replaces an earlier one.
    pub fn new(stops: impl IntoIterator<Item = (u32, Color)>) -> Self {
        let mut sorted: Vec<(u32, Color)> = Vec::new();
        for (threshold, color) in stops {
            match sorted.binary_search_by_key(&threshold, |(t, _)| *t) {
                Ok(i) => sorted[i].1 = color,
                Err(i) => sorted.insert(i, (threshold, color)),
            }
        }
        Self { stops: sorted }
    }

    /// The stops, sorted by threshold.
    pub fn stops(&self) -> &[(u32, Color)] {
        &self.stops
    }

    /// Color of the highest stop at or below `bikes`.
    ///
    /// Counts below the first stop take the first stop's color.
    pub fn color_for(&self, bikes: u32) -> Option<Color> {
        let idx = self.stops.partition_point(|(t, _)| *t <= bikes);
        match idx {
            0 => self.stops.first().map(|(_, c)| *c),
            i => Some(self.stops[i - 1].1),
        }
    }

    /// A MapLibre style expression interpolating linearly between stops.
    pub fn to_expression(&self) -> Value {
        let mut expr = vec![
            json!("interpolate"),
            json!(["linear"]),
            json!(["get", BIKES_PROPERTY]),
        ];
        for (threshold, color) in &self.stops {
            expr.push(json!(threshold));
            expr.push(json!(color.to_string()));
        }
        Value::Array(expr)
    }
}

impl Default for ColorStops {
    /// Red when empty, yellow while scarce, green from four bikes up.
    fn default() -> Self {
        Self::new([
            (0, Color::RED),
            (1, Color::YELLOW),
            (3, Color::YELLOW),
            (4, Color::GREEN),
        ])
    }
}

/// Render features as a GeoJSON `FeatureCollection`.
pub fn to_geojson(features: &[RenderableFeature]) -> Value {
    let features: Vec<Value> = features
        .iter()
        .map(|f| {
            json!({
                "type": "Feature",
                "id": f.station_id,
                "geometry": {
                    "type": "Point",
                    "coordinates": [f.lon, f.lat],
                },
                "properties": {
                    BIKES_PROPERTY: f.bikes_available,
                },
            })
        })
        .collect();

    json!({
        "type": "FeatureCollection",
        "features": features,
    })
}
