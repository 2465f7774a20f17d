//! Graph loading errors.
//!
//! Any of these means "routing unavailable for this band" to callers.
//! None of them is fatal to the process.

use super::band::TimeBand;

/// Why a snapshot could not be produced for a band.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    /// No snapshot source exists for this band.
    #[error("no snapshot available for band {band}")]
    NotFound { band: TimeBand },

    /// The snapshot source could not be read.
    #[error("failed to read snapshot for band {band}: {source}")]
    Io {
        band: TimeBand,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot document is not valid JSON of the expected shape.
    #[error("failed to parse snapshot for band {band}: {source}")]
    Parse {
        band: TimeBand,
        #[source]
        source: serde_json::Error,
    },

    /// Declared metadata counts do not match the actual collections.
    #[error("snapshot {band} declares {declared} {kind}s but contains {actual}")]
    CountMismatch {
        band: TimeBand,
        kind: &'static str,
        declared: usize,
        actual: usize,
    },

    /// An edge references a node index outside the node array.
    #[error("snapshot {band} edge {edge} references node {index} (snapshot has {node_count} nodes)")]
    EdgeOutOfBounds {
        band: TimeBand,
        edge: usize,
        index: usize,
        node_count: usize,
    },
}
