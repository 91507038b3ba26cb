//! Map lifecycle events driving refreshes.
//!
//! The map widget (or anything standing in for it) sends [`MapEvent`]s over
//! a channel. Every event starts a refresh around the latest known viewport
//! center, superseding whatever refresh was still running.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use crate::domain::LatLon;
use crate::gbfs::FeedSource;

use super::center::ViewCenter;
use super::error::SyncError;
use super::orchestrator::SyncOrchestrator;

/// Something happened on the map that warrants fresh station data.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MapEvent {
    /// The map finished loading, centered here.
    MapReady { center: LatLon },
    /// The user stopped panning or zooming, centered here.
    ViewportSettled { center: LatLon },
    /// Manual refresh; keeps the current center.
    RefreshRequested,
}

/// Refresh on every event until the channel closes.
///
/// Viewport events move `center`; every refresh runs around whatever it
/// holds at that moment.
///
/// Failures are logged and otherwise dropped: the next event retries. On
/// exit the in-flight refresh is cancelled and all spawned refreshes are
/// awaited.
pub async fn run_events<F>(
    orchestrator: Arc<SyncOrchestrator<F>>,
    mut events: mpsc::Receiver<MapEvent>,
    center: ViewCenter,
) where
    F: FeedSource + 'static,
{
    let mut refreshes = JoinSet::new();

    while let Some(event) = events.recv().await {
        match event {
            MapEvent::MapReady { center: c } | MapEvent::ViewportSettled { center: c } => {
                center.set(c);
            }
            MapEvent::RefreshRequested => {}
        }
        debug!(?event, "map event");

        let at = center.get();
        let orchestrator = Arc::clone(&orchestrator);
        refreshes.spawn(async move {
            match orchestrator.refresh(at).await {
                Ok(set) => debug!(generation = set.generation, "event refresh done"),
                Err(SyncError::Cancelled) => {}
                Err(e) => warn!(error = %e, "station data could not be refreshed"),
            }
        });

        // Reap finished refreshes so the set doesn't grow unbounded
        while refreshes.try_join_next().is_some() {}
    }

    info!("map event channel closed");
    orchestrator.cancel();
    while refreshes.join_next().await.is_some() {}
}
