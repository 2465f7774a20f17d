//! Request/response DTOs for the JSON API.

use serde::{Deserialize, Serialize};

use crate::domain::JourneyResult;
use crate::graph::StopSearchResult;

/// Query parameters for stop text search.
#[derive(Debug, Deserialize)]
pub struct StopSearchParams {
    pub q: String,
    pub limit: Option<usize>,
}

/// Query parameters for nearest-stop lookup.
#[derive(Debug, Deserialize)]
pub struct NearestStopParams {
    pub lat: f64,
    pub lon: f64,
}

/// Query parameters for route planning between stop indices.
#[derive(Debug, Deserialize)]
pub struct RouteParams {
    pub from: usize,
    pub to: usize,
}

/// A stop in a search or nearest-stop response.
#[derive(Debug, Serialize)]
pub struct StopView {
    pub node_index: usize,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_meters: Option<f64>,
}

impl From<StopSearchResult> for StopView {
    fn from(result: StopSearchResult) -> Self {
        Self {
            node_index: result.node_index,
            name: result.stop_name,
            distance_meters: result.distance_meters,
        }
    }
}

/// Response for stop text search.
#[derive(Debug, Serialize)]
pub struct StopSearchResponse {
    pub stops: Vec<StopView>,
}

/// Response for route planning. `journeys` is empty when no route exists
/// or routing is unavailable; `cached` reports whether the journey cache
/// answered without a fresh path computation.
#[derive(Debug, Serialize)]
pub struct RouteResponse {
    pub journeys: Vec<JourneyResult>,
    pub cached: bool,
}

/// Error body for failed requests.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}
