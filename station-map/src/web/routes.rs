//! HTTP route handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use tracing::warn;

use crate::domain::LatLon;
use crate::sync::{MapEvent, SyncError};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stations", get(stations))
        .route("/refresh", post(refresh))
        .route("/viewport", post(viewport))
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// The most recently published stations.
async fn stations(State(state): State<AppState>) -> Json<StationsResponse> {
    let current = state.orchestrator.current();
    Json(StationsResponse::new(
        &current,
        &state.orchestrator.config().color_stops,
    ))
}

/// Manual refresh of the current view.
///
/// Waits for the refresh so a failure can be shown to the user.
async fn refresh(State(state): State<AppState>) -> Result<Json<StationsResponse>, AppError> {
    let set = state.orchestrator.refresh(state.current_center()).await?;

    Ok(Json(StationsResponse::new(
        &set,
        &state.orchestrator.config().color_stops,
    )))
}

/// The map settled on a new center; refresh in the background.
///
/// The center is recorded before the event is queued so a manual refresh
/// that arrives first already targets it.
async fn viewport(
    State(state): State<AppState>,
    Query(req): Query<ViewportRequest>,
) -> Result<(StatusCode, Json<AcceptedResponse>), AppError> {
    let center = LatLon::parse(req.lat, req.lon).map_err(|e| AppError::BadRequest {
        message: e.to_string(),
    })?;

    state.center.set(center);
    state
        .events
        .send(MapEvent::ViewportSettled { center })
        .await
        .map_err(|_| AppError::Unavailable {
            message: "refresh loop is not running".to_string(),
        })?;

    let generation = state.orchestrator.current().generation;
    Ok((StatusCode::ACCEPTED, Json(AcceptedResponse { generation })))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    Conflict { message: String },
    BadGateway { message: String },
    Unavailable { message: String },
}

impl From<SyncError> for AppError {
    fn from(e: SyncError) -> Self {
        match e {
            SyncError::Cancelled => AppError::Conflict {
                message: "superseded by a newer refresh".to_string(),
            },
            SyncError::Fetch(_) | SyncError::Decode(_) => AppError::BadGateway {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::Conflict { message } => (StatusCode::CONFLICT, message),
            AppError::BadGateway { message } => (StatusCode::BAD_GATEWAY, message),
            AppError::Unavailable { message } => (StatusCode::SERVICE_UNAVAILABLE, message),
        };

        warn!(%status, error = %message, "request failed");

        let body = Json(ErrorResponse { error: message });
        (status, body).into_response()
    }
}
