//! Web layer for the station map.
//!
//! Serves the latest published stations as GeoJSON for a map front-end and
//! accepts refresh triggers carrying the current viewport center.

mod dto;
mod routes;
mod state;

pub use dto::*;
pub use routes::{AppError, create_router};
pub use state::AppState;
