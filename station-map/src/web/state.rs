//! Application state for the web layer.

use std::sync::Arc;

use tokio::sync::mpsc;

use crate::domain::LatLon;
use crate::gbfs::FeedClient;
use crate::sync::{MapEvent, SyncOrchestrator, ViewCenter};

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Refresh pipeline over the live feeds
    pub orchestrator: Arc<SyncOrchestrator<FeedClient>>,

    /// Map events consumed by the background event loop
    pub events: mpsc::Sender<MapEvent>,

    /// Latest requested viewport center, shared with the event loop
    pub center: ViewCenter,
}

impl AppState {
    /// Create a new app state.
    pub fn new(
        orchestrator: Arc<SyncOrchestrator<FeedClient>>,
        events: mpsc::Sender<MapEvent>,
        center: ViewCenter,
    ) -> Self {
        Self {
            orchestrator,
            events,
            center,
        }
    }

    /// Where the map was last asked to show stations.
    pub fn current_center(&self) -> LatLon {
        self.center.get()
    }
}
