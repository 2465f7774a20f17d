//! Time-banded network graphs: snapshots, sources and the store.

pub mod band;
pub mod error;
pub mod snapshot;
pub mod source;
pub mod store;

pub use band::TimeBand;
pub use error::SnapshotError;
pub use snapshot::{Edge, GraphSnapshot, Node, SnapshotMetadata};
pub use source::{AssetDir, SnapshotSource};
pub use store::{GraphStore, StopSearchResult};
