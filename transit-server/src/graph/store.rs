//! Time-banded graph store.
//!
//! Maps wall-clock time to a service band, materializes each band's
//! snapshot at most once per process, and answers stop queries over the
//! active snapshot. Snapshots that fail validation are rejected and never
//! memoized, so a later retry sees the (possibly repaired) source again.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

use chrono::Timelike;
use tracing::{info, warn};

use crate::domain::Clock;

use super::band::TimeBand;
use super::error::SnapshotError;
use super::snapshot::GraphSnapshot;
use super::source::SnapshotSource;

/// Mean Earth radius in meters.
const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// A stop matched by a text or coordinate query.
#[derive(Debug, Clone, PartialEq)]
pub struct StopSearchResult {
    /// Index of the stop in the active snapshot.
    pub node_index: usize,
    pub stop_name: String,
    /// Distance from the query point; only set by nearest-stop lookups.
    pub distance_meters: Option<f64>,
}

/// Store of per-band network snapshots.
pub struct GraphStore {
    source: Box<dyn SnapshotSource>,
    clock: Arc<dyn Clock>,
    loaded: Mutex<HashMap<TimeBand, Arc<GraphSnapshot>>>,
    current: Mutex<Option<Arc<GraphSnapshot>>>,
}

impl GraphStore {
    pub fn new(source: impl SnapshotSource + 'static, clock: Arc<dyn Clock>) -> Self {
        Self {
            source: Box::new(source),
            clock,
            loaded: Mutex::new(HashMap::new()),
            current: Mutex::new(None),
        }
    }

    /// Band for the current local time.
    pub fn band_for_now(&self) -> TimeBand {
        TimeBand::from_hour(self.clock.now().hour())
    }

    /// Returns the memoized snapshot for `band`, loading and validating it
    /// on first use. Blocks on file I/O; call off the async path.
    pub fn load_graph(&self, band: TimeBand) -> Result<Arc<GraphSnapshot>, SnapshotError> {
        // The guard spans fetch + parse so a band is materialized at most
        // once even under concurrent callers.
        let mut loaded = self.loaded.lock().unwrap();
        if let Some(snapshot) = loaded.get(&band) {
            return Ok(snapshot.clone());
        }

        let started = Instant::now();
        let bytes = self.source.fetch(band)?;
        let snapshot = match GraphSnapshot::from_slice(band, &bytes) {
            Ok(snapshot) => Arc::new(snapshot),
            Err(error) => {
                warn!(%band, %error, "rejected graph snapshot");
                return Err(error);
            }
        };

        info!(
            %band,
            nodes = snapshot.node_count(),
            edges = snapshot.edge_count(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "loaded graph snapshot"
        );
        loaded.insert(band, snapshot.clone());
        Ok(snapshot)
    }

    /// Loads the snapshot for "now" and records it as the active one.
    pub fn load_current_graph(&self) -> Result<Arc<GraphSnapshot>, SnapshotError> {
        let band = self.band_for_now();
        let snapshot = self.load_graph(band)?;
        *self.current.lock().unwrap() = Some(snapshot.clone());
        Ok(snapshot)
    }

    /// The active snapshot, if one has been loaded.
    pub fn current_snapshot(&self) -> Option<Arc<GraphSnapshot>> {
        self.current.lock().unwrap().clone()
    }

    /// Band of the active snapshot, if any.
    pub fn current_band(&self) -> Option<TimeBand> {
        self.current.lock().unwrap().as_ref().map(|s| s.band())
    }

    /// Case-insensitive substring search over stop names in the active
    /// snapshot. Results come back in snapshot order, not ranked. A blank
    /// query or a store with no active snapshot yields no results.
    pub fn search_stops(&self, query: &str, limit: usize) -> Vec<StopSearchResult> {
        let query = query.trim();
        if query.is_empty() {
            return Vec::new();
        }
        let Some(snapshot) = self.current_snapshot() else {
            return Vec::new();
        };

        // Unicode lowercasing: stop names carry accents.
        let needle = query.to_lowercase();
        snapshot
            .nodes()
            .iter()
            .enumerate()
            .filter(|(_, node)| node.name.to_lowercase().contains(&needle))
            .take(limit)
            .map(|(node_index, node)| StopSearchResult {
                node_index,
                stop_name: node.name.clone(),
                distance_meters: None,
            })
            .collect()
    }

    /// Closest stop to `(lat, lon)` by great-circle distance, scanning
    /// every node of the active snapshot. Ties keep the first stop in
    /// snapshot order. `None` when no snapshot is active or it is empty.
    pub fn find_nearest_stop(&self, lat: f64, lon: f64) -> Option<StopSearchResult> {
        let snapshot = self.current_snapshot()?;

        let mut best: Option<(usize, f64)> = None;
        for (index, node) in snapshot.nodes().iter().enumerate() {
            let distance = haversine_meters(lat, lon, node.y, node.x);
            if best.is_none_or(|(_, d)| distance < d) {
                best = Some((index, distance));
            }
        }

        best.map(|(node_index, distance)| StopSearchResult {
            node_index,
            stop_name: snapshot.nodes()[node_index].name.clone(),
            distance_meters: Some(distance),
        })
    }
}

/// Great-circle distance between two (lat, lon) points in meters.
fn haversine_meters(lat1: f64, lon1: f64, lat2: f64, lon2: f64) -> f64 {
    let phi1 = lat1.to_radians();
    let phi2 = lat2.to_radians();
    let dphi = (lat2 - lat1).to_radians();
    let dlambda = (lon2 - lon1).to_radians();

    let a = (dphi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (dlambda / 2.0).sin().powi(2);
    2.0 * EARTH_RADIUS_M * a.sqrt().asin()
}
