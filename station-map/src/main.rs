use std::error::Error;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use station_map::config::AppConfig;
use station_map::gbfs::FeedClient;
use station_map::project::{Color, ColorStops};
use station_map::sync::{
    FeatureSet, MapEvent, RenderSink, SyncOrchestrator, ViewCenter, run_events,
};
use station_map::web::{AppState, create_router};

/// Capacity of the map event channel.
const EVENT_BUFFER: usize = 16;

/// Logs a summary of each published station layer.
struct LogSink;

impl RenderSink for LogSink {
    fn render(&self, features: &FeatureSet, stops: &ColorStops) {
        let count = |color: Color| {
            features
                .features
                .iter()
                .filter(|f| stops.color_for(f.bikes_available) == Some(color))
                .count()
        };
        info!(
            generation = features.generation,
            stations = features.len(),
            empty = count(Color::RED),
            scarce = count(Color::YELLOW),
            plenty = count(Color::GREEN),
            "station layer updated"
        );
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env()?;

    // Two independent clients, one per feed
    let information = FeedClient::new(config.information_feed())?;
    let status = FeedClient::new(config.status_feed())?;
    info!(
        information = information.url(),
        status = status.url(),
        radius_meters = config.radius_meters,
        "configured feeds"
    );

    let orchestrator = Arc::new(SyncOrchestrator::new(
        information,
        status,
        config.sync_config(),
    ));
    orchestrator.add_sink(Arc::new(LogSink));

    // Map events drive refreshes; the first one loads the initial view
    let center = ViewCenter::new(config.initial_center);
    let (events, events_rx) = mpsc::channel(EVENT_BUFFER);
    tokio::spawn(run_events(
        Arc::clone(&orchestrator),
        events_rx,
        center.clone(),
    ));
    events
        .send(MapEvent::MapReady {
            center: config.initial_center,
        })
        .await?;

    // Periodic refresh of whatever the map is showing
    let ticker = events.clone();
    let refresh_interval = config.refresh_interval;
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(refresh_interval);
        interval.tick().await; // First tick is immediate, skip it
        loop {
            interval.tick().await;
            if ticker.send(MapEvent::RefreshRequested).await.is_err() {
                error!("map event loop stopped; periodic refresh disabled");
                break;
            }
        }
    });

    let state = AppState::new(orchestrator, events, center);
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    info!("Station map listening on http://{}", config.bind_addr);
    info!("  GET  /health    - Health check");
    info!("  GET  /stations  - Current stations as GeoJSON");
    info!("  POST /refresh   - Refresh the current view now");
    info!("  POST /viewport  - Move the view (?lat=..&lon=..)");

    axum::serve(listener, app).await?;

    Ok(())
}
