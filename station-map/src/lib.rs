//! Bike-share station map server.
//!
//! Pulls the GBFS station information and station status feeds, joins
//! them, keeps the stations near the map's viewport and publishes them as
//! point features colored by how many bikes are available.

pub mod config;
pub mod domain;
pub mod gbfs;
pub mod join;
pub mod project;
pub mod proximity;
pub mod sync;
pub mod web;
