//! The refresh pipeline: fetch → decode → join → filter → project → publish.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::domain::{LatLon, StationInfo, StationStatus};
use crate::gbfs::{Decoded, FeedSource, decode_information, decode_status};
use crate::join::join_with_stats;
use crate::project::{ColorStops, project};
use crate::proximity::{DEFAULT_RADIUS_METERS, filter_nearby};

use super::error::SyncError;
use super::state::{FeatureSet, RenderSink};

/// Configuration for the sync pipeline.
#[derive(Debug, Clone)]
pub struct SyncConfig {
    /// Stations farther than this from the viewport center are dropped.
    pub radius_meters: f64,

    /// Color table passed to rendering sinks with each feature set.
    pub color_stops: ColorStops,
}

impl SyncConfig {
    /// Set the proximity radius.
    pub fn with_radius(mut self, meters: f64) -> Self {
        self.radius_meters = meters;
        self
    }

    /// Set the color table.
    pub fn with_color_stops(mut self, stops: ColorStops) -> Self {
        self.color_stops = stops;
        self
    }
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            radius_meters: DEFAULT_RADIUS_METERS,
            color_stops: ColorStops::default(),
        }
    }
}

/// Coordinates refreshes and owns the published feature set.
///
/// Each call to [`refresh`](Self::refresh) supersedes the one before it:
/// the older refresh is cancelled and can no longer publish, so observers
/// only ever see complete results from the latest cycle.
pub struct SyncOrchestrator<F: FeedSource> {
    information: F,
    status: F,
    config: SyncConfig,
    /// Token of the most recently started refresh.
    in_flight: Mutex<CancellationToken>,
    next_generation: AtomicU64,
    published: watch::Sender<Arc<FeatureSet>>,
    /// Held while publishing so sinks see sets in publish order.
    sinks: Mutex<Vec<Arc<dyn RenderSink>>>,
}

impl<F: FeedSource> SyncOrchestrator<F> {
    /// Create an orchestrator over the two feed sources.
    pub fn new(information: F, status: F, config: SyncConfig) -> Self {
        let (published, _) = watch::channel(Arc::new(FeatureSet::empty()));

        Self {
            information,
            status,
            config,
            in_flight: Mutex::new(CancellationToken::new()),
            next_generation: AtomicU64::new(1),
            published,
            sinks: Mutex::new(Vec::new()),
        }
    }

    /// The pipeline configuration.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Register a sink to be called after every successful publish.
    pub fn add_sink(&self, sink: Arc<dyn RenderSink>) {
        lock(&self.sinks).push(sink);
    }

    /// Watch the published feature set.
    pub fn subscribe(&self) -> watch::Receiver<Arc<FeatureSet>> {
        self.published.subscribe()
    }

    /// The most recently published feature set.
    pub fn current(&self) -> Arc<FeatureSet> {
        Arc::clone(&self.published.borrow())
    }

    /// Cancel the in-flight refresh, if any.
    ///
    /// The published set is left as it is.
    pub fn cancel(&self) {
        lock(&self.in_flight).cancel();
    }

    /// Run one refresh cycle around `center`.
    ///
    /// On success the new feature set has been published and every sink has
    /// rendered it. On failure nothing is published.
    pub async fn refresh(&self, center: LatLon) -> Result<Arc<FeatureSet>, SyncError> {
        let (generation, token) = self.begin();

        info!(generation, lat = center.lat, lon = center.lon, "refreshing stations");

        let loaded = tokio::select! {
            biased;
            _ = token.cancelled() => {
                debug!(generation, "refresh cancelled while fetching");
                return Err(SyncError::Cancelled);
            }
            loaded = self.load() => loaded,
        };

        let (information, status) = loaded.inspect_err(|e| {
            warn!(generation, error = %e, "refresh failed");
        })?;

        let (joined, stats) = join_with_stats(&information.records, &status.records);
        let nearby = filter_nearby(&joined, center, self.config.radius_meters);
        let features = project(&nearby);

        debug!(
            generation,
            information = stats.information,
            status = stats.status,
            joined = stats.joined,
            missing_status = stats.missing_status,
            orphan_status = stats.orphan_status,
            nearby = features.len(),
            "joined feeds"
        );

        let set = Arc::new(FeatureSet {
            generation,
            center: Some(center),
            features,
            information: Some(information.metadata),
            status: Some(status.metadata),
        });

        self.publish(&token, set)
    }

    /// Supersede the previous refresh and start a new generation.
    fn begin(&self) -> (u64, CancellationToken) {
        let mut in_flight = lock(&self.in_flight);
        in_flight.cancel();

        let token = CancellationToken::new();
        *in_flight = token.clone();
        let generation = self.next_generation.fetch_add(1, Ordering::SeqCst);

        (generation, token)
    }

    /// Fetch and decode both feeds concurrently.
    async fn load(
        &self,
    ) -> Result<(Decoded<StationInfo>, Decoded<StationStatus>), SyncError> {
        let information = async {
            let body = self.information.fetch().await?;
            Ok::<_, SyncError>(decode_information(&body)?)
        };
        let status = async {
            let body = self.status.fetch().await?;
            Ok::<_, SyncError>(decode_status(&body)?)
        };

        tokio::try_join!(information, status)
    }

    fn publish(
        &self,
        token: &CancellationToken,
        set: Arc<FeatureSet>,
    ) -> Result<Arc<FeatureSet>, SyncError> {
        let sinks = lock(&self.sinks);

        let published = self.published.send_if_modified(|current| {
            if token.is_cancelled() || current.generation > set.generation {
                return false;
            }
            *current = Arc::clone(&set);
            true
        });

        if !published {
            debug!(generation = set.generation, "refresh superseded before publish");
            return Err(SyncError::Cancelled);
        }

        for sink in sinks.iter() {
            sink.render(&set, &self.config.color_stops);
        }

        info!(
            generation = set.generation,
            stations = set.len(),
            "published stations"
        );

        Ok(set)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    // Nothing panics while these locks are held
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::StationId;
    use crate::gbfs::{FeedKind, MockFeed};

    /// Information = A (35.0, 139.0), B (35.1, 139.1)
    const INFORMATION: &str = r#"{
        "ttl": 60, "version": "2.3", "last_updated": 1700000000,
        "data": {"stations": [
            {"station_id": "A", "name": "A", "lat": 35.0, "lon": 139.0},
            {"station_id": "B", "name": "B", "lat": 35.1, "lon": 139.1}
        ]}
    }"#;

    /// Status = A with 3 bikes
    const STATUS: &str = r#"{
        "ttl": 60, "version": "2.3", "last_updated": 1700000010,
        "data": {"stations": [
            {"station_id": "A", "is_installed": true, "is_renting": true,
             "is_returning": true, "num_bikes_available": 3, "num_docks_available": 7}
        ]}
    }"#;

    fn status_with(bikes: u32) -> String {
        STATUS.replace("\"num_bikes_available\": 3", &format!("\"num_bikes_available\": {bikes}"))
    }

    /// Sink that records every generation it renders.
    #[derive(Default)]
    struct RecordingSink {
        rendered: Mutex<Vec<u64>>,
    }

    impl RenderSink for RecordingSink {
        fn render(&self, features: &FeatureSet, _stops: &ColorStops) {
            lock(&self.rendered).push(features.generation);
        }
    }

    impl RecordingSink {
        fn rendered(&self) -> Vec<u64> {
            lock(&self.rendered).clone()
        }
    }

    fn setup(
        information: MockFeed,
        status: MockFeed,
    ) -> (Arc<SyncOrchestrator<MockFeed>>, Arc<RecordingSink>) {
        let orchestrator = Arc::new(SyncOrchestrator::new(
            information,
            status,
            SyncConfig::default(),
        ));
        let sink = Arc::new(RecordingSink::default());
        orchestrator.add_sink(sink.clone());
        (orchestrator, sink)
    }

    fn feeds() -> (MockFeed, MockFeed) {
        (
            MockFeed::new(FeedKind::Information, INFORMATION),
            MockFeed::new(FeedKind::Status, STATUS),
        )
    }

    #[tokio::test]
    async fn refresh_end_to_end() {
        let (information, status) = feeds();
        let (orchestrator, sink) = setup(information, status);

        let set = orchestrator
            .refresh(LatLon::new(35.0, 139.0))
            .await
            .unwrap();

        assert_eq!(set.features.len(), 1);
        let feature = &set.features[0];
        assert_eq!(feature.station_id, StationId::from("A"));
        assert_eq!(feature.bikes_available, 3);
        assert_eq!(set.center, Some(LatLon::new(35.0, 139.0)));
        assert_eq!(set.information.as_ref().unwrap().ttl, 60);
        assert_eq!(
            set.status.as_ref().unwrap().last_updated.timestamp(),
            1_700_000_010
        );

        assert_eq!(orchestrator.current(), set);
        assert_eq!(sink.rendered(), vec![set.generation]);
    }

    #[tokio::test]
    async fn radius_comes_from_config() {
        let (information, status) = feeds();
        let orchestrator = SyncOrchestrator::new(
            information,
            status.clone(),
            SyncConfig::default().with_radius(100.0),
        );
        status.set_body(STATUS.replace("\"A\"", "\"B\""));

        // B is ~14 km from A's position
        let set = orchestrator.refresh(LatLon::new(35.0, 139.0)).await.unwrap();
        assert!(set.is_empty());

        let set = orchestrator.refresh(LatLon::new(35.1, 139.1)).await.unwrap();
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn status_fetch_failure_publishes_nothing() {
        let (information, status) = feeds();
        let (orchestrator, sink) = setup(information, status.clone());

        let first = orchestrator.refresh(LatLon::new(35.0, 139.0)).await.unwrap();

        status.set_status(503);
        let err = orchestrator
            .refresh(LatLon::new(35.0, 139.0))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Fetch(_)));
        assert_eq!(err.feed(), Some(FeedKind::Status));
        assert_eq!(orchestrator.current(), first);
        assert_eq!(sink.rendered(), vec![first.generation]);
    }

    #[tokio::test]
    async fn information_transport_failure_is_fetch_error() {
        let (orchestrator, sink) = setup(
            MockFeed::failing_transport(FeedKind::Information, "connection reset"),
            MockFeed::new(FeedKind::Status, STATUS),
        );

        let err = orchestrator
            .refresh(LatLon::new(35.0, 139.0))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Fetch(_)));
        assert_eq!(orchestrator.current().generation, 0);
        assert!(sink.rendered().is_empty());
    }

    #[tokio::test]
    async fn decode_failure_publishes_nothing() {
        let (information, status) = feeds();
        let (orchestrator, sink) = setup(information.clone(), status);

        let first = orchestrator.refresh(LatLon::new(35.0, 139.0)).await.unwrap();

        information.set_body(r#"{"ttl": 60, "version": "2.3", "last_updated": 0}"#);
        let err = orchestrator
            .refresh(LatLon::new(35.0, 139.0))
            .await
            .unwrap_err();

        assert!(matches!(err, SyncError::Decode(_)));
        assert_eq!(err.feed(), Some(FeedKind::Information));
        assert_eq!(orchestrator.current(), first);
        assert_eq!(sink.rendered().len(), 1);
    }

    #[tokio::test]
    async fn fetches_both_feeds_each_cycle() {
        let (information, status) = feeds();
        let (orchestrator, _sink) = setup(information.clone(), status.clone());

        orchestrator.refresh(LatLon::new(35.0, 139.0)).await.unwrap();
        orchestrator.refresh(LatLon::new(35.0, 139.0)).await.unwrap();

        assert_eq!(information.calls(), 2);
        assert_eq!(status.calls(), 2);
    }

    #[tokio::test]
    async fn feeds_are_fetched_concurrently() {
        let (information, status) = feeds();
        let (orchestrator, _sink) = setup(information.clone(), status.clone());

        // Hold information open; status must still be requested
        let hold = information.hold_next();
        let task = tokio::spawn({
            let orchestrator = Arc::clone(&orchestrator);
            async move { orchestrator.refresh(LatLon::new(35.0, 139.0)).await }
        });

        while status.calls() == 0 {
            tokio::task::yield_now().await;
        }
        assert_eq!(information.calls(), 1);
        assert!(!task.is_finished());

        hold.notify_one();
        let set = task.await.unwrap().unwrap();
        assert_eq!(set.len(), 1);
    }

    #[tokio::test]
    async fn new_refresh_supersedes_in_flight() {
        let (information, status) = feeds();
        let (orchestrator, sink) = setup(information.clone(), status.clone());

        let published = orchestrator.refresh(LatLon::new(35.0, 139.0)).await.unwrap();

        // The next refresh stalls on the information feed
        let _hold = information.hold_next();
        let stale = tokio::spawn({
            let orchestrator = Arc::clone(&orchestrator);
            async move { orchestrator.refresh(LatLon::new(35.0, 139.0)).await }
        });
        while information.calls() < 2 {
            tokio::task::yield_now().await;
        }
        assert_eq!(orchestrator.current(), published);

        // A newer refresh with fresh data completes and cancels the stalled one
        status.set_body(status_with(9));
        let fresh = orchestrator.refresh(LatLon::new(35.0, 139.0)).await.unwrap();
        assert_eq!(fresh.features[0].bikes_available, 9);

        let err = stale.await.unwrap().unwrap_err();
        assert!(matches!(err, SyncError::Cancelled));

        assert_eq!(orchestrator.current(), fresh);
        assert_eq!(sink.rendered(), vec![published.generation, fresh.generation]);
    }

    #[tokio::test]
    async fn cancel_leaves_published_set_untouched() {
        let (information, status) = feeds();
        let (orchestrator, sink) = setup(information, status.clone());

        let published = orchestrator.refresh(LatLon::new(35.0, 139.0)).await.unwrap();

        let hold = status.hold_next();
        let task = tokio::spawn({
            let orchestrator = Arc::clone(&orchestrator);
            async move { orchestrator.refresh(LatLon::new(35.0, 139.0)).await }
        });
        while status.calls() < 2 {
            tokio::task::yield_now().await;
        }

        orchestrator.cancel();
        // Releasing the feed afterwards must not let the cancelled cycle publish
        hold.notify_one();

        let err = task.await.unwrap().unwrap_err();
        assert!(matches!(err, SyncError::Cancelled));
        assert_eq!(orchestrator.current(), published);
        assert_eq!(sink.rendered(), vec![published.generation]);
    }

    #[tokio::test]
    async fn subscribers_see_new_sets() {
        let (information, status) = feeds();
        let (orchestrator, _sink) = setup(information, status);
        let mut rx = orchestrator.subscribe();

        assert_eq!(rx.borrow().generation, 0);

        orchestrator.refresh(LatLon::new(35.0, 139.0)).await.unwrap();

        assert!(rx.has_changed().unwrap());
        let seen = rx.borrow_and_update().clone();
        assert_eq!(seen.len(), 1);
        assert!(seen.generation > 0);
    }

    #[tokio::test]
    async fn empty_status_feed_publishes_empty_set() {
        let (information, status) = feeds();
        let (orchestrator, sink) = setup(information, status.clone());
        status.set_body(r#"{"ttl": 60, "version": "2.3", "last_updated": 0, "data": {"stations": []}}"#);

        let set = orchestrator.refresh(LatLon::new(35.0, 139.0)).await.unwrap();
        assert!(set.is_empty());
        assert_eq!(sink.rendered(), vec![set.generation]);
    }
}
