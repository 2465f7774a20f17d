//! Route search facade.
//!
//! The only entry point callers use: composes the graph store and the
//! shortest-path engine, owns re-selection of the snapshot when the time
//! band changes, and turns "no snapshot available" into the expected
//! empty answer instead of an error.

use std::sync::Arc;

use tracing::{info, warn};

use crate::graph::{GraphSnapshot, GraphStore, StopSearchResult, TimeBand};

use super::dijkstra::{RouteError, RoutePath, shortest_path};

/// Facade over the graph store and the shortest-path engine.
pub struct RoutePlanner {
    store: Arc<GraphStore>,
}

impl RoutePlanner {
    pub fn new(store: Arc<GraphStore>) -> Self {
        Self { store }
    }

    /// Stop search over the active snapshot.
    pub fn search_stops(&self, query: &str, limit: usize) -> Vec<StopSearchResult> {
        self.store.search_stops(query, limit)
    }

    /// Nearest stop to a coordinate in the active snapshot.
    pub fn find_nearest_stop(&self, lat: f64, lon: f64) -> Option<StopSearchResult> {
        self.store.find_nearest_stop(lat, lon)
    }

    /// Band of the active snapshot, if one is loaded.
    pub fn current_band(&self) -> Option<TimeBand> {
        self.store.current_band()
    }

    /// The active snapshot, loading the current band's if none is active.
    ///
    /// Returns `None` when no snapshot can be produced — routing is
    /// unavailable, which is an expected condition, not an error.
    pub async fn ensure_snapshot(&self) -> Option<Arc<GraphSnapshot>> {
        if let Some(snapshot) = self.store.current_snapshot() {
            return Some(snapshot);
        }

        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || store.load_current_graph()).await {
            Ok(Ok(snapshot)) => Some(snapshot),
            Ok(Err(error)) => {
                warn!(%error, "routing unavailable: no graph snapshot");
                None
            }
            Err(error) => {
                warn!(%error, "snapshot load task failed");
                None
            }
        }
    }

    /// Minimum-cost path between two stop indices on the active snapshot.
    ///
    /// `Ok(None)` both when the stops are disconnected and when no
    /// snapshot can be loaded; out-of-range indices are an error the
    /// caller must surface.
    pub async fn find_route(&self, from: usize, to: usize) -> Result<Option<RoutePath>, RouteError> {
        let Some(snapshot) = self.ensure_snapshot().await else {
            return Ok(None);
        };
        shortest_path(&snapshot, from, to)
    }

    /// Re-evaluates the band for "now" and swaps the active snapshot if
    /// the band changed. Previously loaded bands stay memoized, so
    /// revisiting one later the same day costs nothing.
    pub async fn refresh_graph(&self) {
        let band = self.store.band_for_now();
        if self.store.current_band() == Some(band) {
            return;
        }

        let store = self.store.clone();
        match tokio::task::spawn_blocking(move || store.load_current_graph()).await {
            Ok(Ok(snapshot)) => {
                info!(band = %snapshot.band(), "switched active graph snapshot");
            }
            Ok(Err(error)) => {
                warn!(%band, %error, "band changed but snapshot unavailable");
            }
            Err(error) => {
                warn!(%error, "snapshot refresh task failed");
            }
        }
    }
}
