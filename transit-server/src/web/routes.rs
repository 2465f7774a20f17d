//! HTTP route handlers.
//!
//! The web layer is the caller of the routing core: it builds cache keys
//! from query parameters, serves cache hits without touching the engine,
//! and formats computed paths into journey documents.

use axum::{
    Json, Router,
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use chrono::{DateTime, Local};
use tower_http::trace::TraceLayer;
use tracing::warn;

use crate::domain::{JourneyLeg, JourneyResult};
use crate::graph::{GraphSnapshot, Node};
use crate::planner::{RouteError, RoutePath};

use super::dto::*;
use super::state::AppState;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/stops/search", get(search_stops))
        .route("/stops/nearest", get(nearest_stop))
        .route("/route", get(plan_route))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Health check endpoint.
async fn health() -> &'static str {
    "ok"
}

/// Search stops by name over the active snapshot.
async fn search_stops(
    State(state): State<AppState>,
    Query(params): Query<StopSearchParams>,
) -> Json<StopSearchResponse> {
    let limit = params.limit.unwrap_or(10).min(50);
    let stops = state
        .planner
        .search_stops(&params.q, limit)
        .into_iter()
        .map(StopView::from)
        .collect();

    Json(StopSearchResponse { stops })
}

/// Nearest stop to a coordinate.
async fn nearest_stop(
    State(state): State<AppState>,
    Query(params): Query<NearestStopParams>,
) -> Result<Json<StopView>, AppError> {
    if !(-90.0..=90.0).contains(&params.lat) || !(-180.0..=180.0).contains(&params.lon) {
        return Err(AppError::BadRequest {
            message: format!("invalid coordinate: ({}, {})", params.lat, params.lon),
        });
    }

    match state.planner.find_nearest_stop(params.lat, params.lon) {
        Some(stop) => Ok(Json(StopView::from(stop))),
        None => Err(AppError::NotFound {
            message: "no stops in the active snapshot".to_string(),
        }),
    }
}

/// Plan a journey between two stop indices.
///
/// Identical queries within the validity window are answered from the
/// journey cache without running the engine.
async fn plan_route(
    State(state): State<AppState>,
    Query(params): Query<RouteParams>,
) -> Result<Json<RouteResponse>, AppError> {
    // the cache key depends on the active band, so select one first
    let Some(snapshot) = state.planner.ensure_snapshot().await else {
        return Ok(Json(RouteResponse {
            journeys: Vec::new(),
            cached: false,
        }));
    };

    let key = format!("{}:{}:{}", snapshot.band(), params.from, params.to);
    if let Some(journeys) = state.cache.get(&key).await {
        return Ok(Json(RouteResponse {
            journeys,
            cached: true,
        }));
    }

    let Some(path) = state.planner.find_route(params.from, params.to).await? else {
        return Ok(Json(RouteResponse {
            journeys: Vec::new(),
            cached: false,
        }));
    };

    let journeys = vec![journey_from_path(&snapshot, &path, Local::now())];
    state.cache.put(&key, journeys.clone()).await;

    Ok(Json(RouteResponse {
        journeys,
        cached: false,
    }))
}

/// Formats a computed path into a journey document, one leg per traversed
/// edge, with times derived from the departure instant plus accumulated
/// edge costs.
fn journey_from_path(
    snapshot: &GraphSnapshot,
    path: &RoutePath,
    departure: DateTime<Local>,
) -> JourneyResult {
    let departure_time = departure.timestamp();
    let mut at = departure_time;
    let mut legs = Vec::with_capacity(path.edge_costs.len());

    for (i, &cost) in path.edge_costs.iter().enumerate() {
        let from = &snapshot.nodes()[path.nodes[i]];
        let to = &snapshot.nodes()[path.nodes[i + 1]];
        let arrival = at + cost as i64;
        legs.push(JourneyLeg {
            from_stop_id: from.id.clone(),
            from_stop_name: from.name.clone(),
            to_stop_id: to.id.clone(),
            to_stop_name: to.name.clone(),
            departure_time: at,
            arrival_time: arrival,
            route_name: None,
            route_color: None,
            is_walking: is_walking_between(from, to),
            direction: None,
            intermediate_stops: Vec::new(),
        });
        at = arrival;
    }

    JourneyResult {
        departure_time,
        arrival_time: at,
        legs,
    }
}

/// Stops that share no transport mode can only be connected on foot.
fn is_walking_between(from: &Node, to: &Node) -> bool {
    !from
        .modes
        .iter()
        .any(|mode| to.modes.iter().any(|other| other == mode))
}

/// Application error type.
#[derive(Debug)]
pub enum AppError {
    BadRequest { message: String },
    NotFound { message: String },
}

impl From<RouteError> for AppError {
    fn from(e: RouteError) -> Self {
        match e {
            RouteError::InvalidNodeIndex { .. } => AppError::BadRequest {
                message: e.to_string(),
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            AppError::BadRequest { message } => (StatusCode::BAD_REQUEST, message),
            AppError::NotFound { message } => (StatusCode::NOT_FOUND, message),
        };

        warn!(%status, %message, "request failed");
        (status, Json(ErrorResponse { error: message })).into_response()
    }
}
