//! Application state for the web layer.

use std::sync::Arc;

use crate::cache::JourneyCache;
use crate::planner::RoutePlanner;

/// Shared application state.
#[derive(Clone)]
pub struct AppState {
    /// Route planning facade over the graph store.
    pub planner: Arc<RoutePlanner>,

    /// Two-tier journey result cache.
    pub cache: Arc<JourneyCache>,
}

impl AppState {
    pub fn new(planner: RoutePlanner, cache: JourneyCache) -> Self {
        Self {
            planner: Arc::new(planner),
            cache: Arc::new(cache),
        }
    }
}
