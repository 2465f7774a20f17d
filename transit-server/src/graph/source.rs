//! Snapshot byte-stream sources.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use super::band::TimeBand;
use super::error::SnapshotError;

/// Provides the serialized snapshot document for a band.
///
/// This is the seam between the store and wherever snapshots physically
/// live: generated files in an asset directory in production, in-memory
/// fixtures in tests.
pub trait SnapshotSource: Send + Sync {
    /// Returns the raw snapshot document for `band`.
    fn fetch(&self, band: TimeBand) -> Result<Vec<u8>, SnapshotError>;
}

/// Reads `network_<band>.json` files from an asset directory, the layout
/// produced by the snapshot generator.
#[derive(Debug, Clone)]
pub struct AssetDir {
    dir: PathBuf,
}

impl AssetDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path of the snapshot file for a band.
    pub fn path_for(&self, band: TimeBand) -> PathBuf {
        self.dir.join(format!("network_{band}.json"))
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl SnapshotSource for AssetDir {
    fn fetch(&self, band: TimeBand) -> Result<Vec<u8>, SnapshotError> {
        let path = self.path_for(band);
        match std::fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(SnapshotError::NotFound { band }),
            Err(source) => Err(SnapshotError::Io { band, source }),
        }
    }
}
