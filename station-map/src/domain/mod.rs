//! Domain types for the station map.
//!
//! Records decoded from the two GBFS feeds, the joined view built from them,
//! and the point features handed to a rendering sink. Everything here is
//! rebuilt from scratch on each sync cycle; nothing is mutated in place.

mod coord;
mod feature;
mod station;

pub use coord::{InvalidCoordinate, LatLon};
pub use feature::{JoinedStation, RenderableFeature};
pub use station::{StationId, StationInfo, StationStatus};
