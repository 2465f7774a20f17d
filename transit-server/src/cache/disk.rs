//! Compressed on-disk journey cache tier.
//!
//! One gzip file per cache key. The filename embeds the key reversibly
//! (percent-encoded), so preload can recover keys from a directory
//! listing. Entries are only valid on the day they were written: journeys
//! depend on that day's schedule, so the read path checks the file's
//! modification day against "today" before trusting it.
//!
//! Everything here does blocking I/O and is called through
//! `spawn_blocking` by the cache front.

use std::fs;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use chrono::{DateTime, Datelike, Local};
use flate2::Compression;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, percent_decode_str, utf8_percent_encode};
use tracing::warn;

use crate::domain::JourneyResult;

/// Filename shape: prefix + percent-encoded key + suffix.
const FILE_PREFIX: &str = "journey_";
const FILE_SUFFIX: &str = ".json.gz";

/// Everything but ASCII alphanumerics and `-`, `_`, `.` is escaped.
/// `%` stays escaped so decoding is unambiguous.
const KEY_ESCAPE: &AsciiSet = &NON_ALPHANUMERIC.remove(b'-').remove(b'_').remove(b'.');

/// Errors internal to the disk tier. These never reach API callers; the
/// cache front logs them and falls back to memory-only behavior.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("cache I/O failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("cache entry serialization failed: {0}")]
    Serde(#[from] serde_json::Error),
}

/// A cache file with its age and size, as seen by a directory sweep.
#[derive(Debug)]
struct DiskEntry {
    path: PathBuf,
    modified: SystemTime,
    len: u64,
}

/// Size- and age-bounded directory of compressed journey documents.
#[derive(Debug, Clone)]
pub struct DiskTier {
    dir: PathBuf,
    max_entries: usize,
    max_bytes: u64,
    max_age: Duration,
}

impl DiskTier {
    pub fn new(dir: impl Into<PathBuf>, max_entries: usize, max_bytes: u64, max_age: Duration) -> Self {
        Self {
            dir: dir.into(),
            max_entries,
            max_bytes,
            max_age,
        }
    }

    /// File path for a cache key.
    fn path_for(&self, key: &str) -> PathBuf {
        let encoded = utf8_percent_encode(key, KEY_ESCAPE);
        self.dir.join(format!("{FILE_PREFIX}{encoded}{FILE_SUFFIX}"))
    }

    /// Recovers the cache key from one of our filenames.
    fn key_for(file_name: &str) -> Option<String> {
        let encoded = file_name
            .strip_prefix(FILE_PREFIX)?
            .strip_suffix(FILE_SUFFIX)?;
        percent_decode_str(encoded)
            .decode_utf8()
            .ok()
            .map(|key| key.into_owned())
    }

    /// Entry for `key`, if present and written on the local day `today`
    /// (`(year, day-of-year)`). Corrupt entries are deleted and reported
    /// as misses; stale ones are left for the eviction sweep.
    pub fn read(&self, key: &str, today: (i32, u32)) -> Option<Vec<JourneyResult>> {
        self.read_path(&self.path_for(key), today)
    }

    /// Same as [`DiskTier::read`], addressed by path (used by preload).
    pub fn read_path(&self, path: &Path, today: (i32, u32)) -> Option<Vec<JourneyResult>> {
        let modified = fs::metadata(path).ok()?.modified().ok()?;
        if local_day(modified) != today {
            return None;
        }

        match read_document(path) {
            Ok(journeys) => Some(journeys),
            Err(error) => {
                warn!(path = %path.display(), %error, "deleting corrupt cache entry");
                let _ = fs::remove_file(path);
                None
            }
        }
    }

    /// Writes the entry for `key`, then enforces the eviction limits.
    pub fn write(&self, key: &str, journeys: &[JourneyResult]) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;

        let json = serde_json::to_vec(journeys)?;
        let file = fs::File::create(self.path_for(key))?;
        let mut encoder = GzEncoder::new(file, Compression::default());
        encoder.write_all(&json)?;
        encoder.finish()?;

        self.evict()?;
        Ok(())
    }

    /// Applies the age, count and size limits, deleting oldest-first by
    /// modification time.
    pub fn evict(&self) -> Result<(), CacheError> {
        let mut entries = self.list()?;

        // (1) anything older than the staleness cutoff
        let cutoff = SystemTime::now() - self.max_age;
        entries.retain(|entry| {
            if entry.modified < cutoff {
                let _ = fs::remove_file(&entry.path);
                false
            } else {
                true
            }
        });

        // (2) entry count bound
        while entries.len() > self.max_entries {
            let oldest = entries.remove(0);
            let _ = fs::remove_file(&oldest.path);
        }

        // (3) total size bound
        let mut total: u64 = entries.iter().map(|entry| entry.len).sum();
        while total > self.max_bytes && !entries.is_empty() {
            let oldest = entries.remove(0);
            total -= oldest.len;
            let _ = fs::remove_file(&oldest.path);
        }

        Ok(())
    }

    /// The most recently written entries, newest first, as (key, path).
    pub fn recent(&self, count: usize) -> Vec<(String, PathBuf)> {
        let Ok(mut entries) = self.list() else {
            return Vec::new();
        };
        entries.reverse();
        entries
            .into_iter()
            .filter_map(|entry| {
                let name = entry.path.file_name()?.to_str()?;
                Some((Self::key_for(name)?, entry.path.clone()))
            })
            .take(count)
            .collect()
    }

    /// Deletes every cache file.
    pub fn clear(&self) -> Result<(), CacheError> {
        for entry in self.list()? {
            let _ = fs::remove_file(&entry.path);
        }
        Ok(())
    }

    pub fn entry_count(&self) -> usize {
        self.list().map(|entries| entries.len()).unwrap_or(0)
    }

    /// Our cache files, oldest first by modification time. Foreign files
    /// in the directory are ignored. A missing directory is an empty tier.
    fn list(&self) -> Result<Vec<DiskEntry>, CacheError> {
        let dir = match fs::read_dir(&self.dir) {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for item in dir {
            let item = item?;
            let name = item.file_name();
            let Some(name) = name.to_str() else { continue };
            if !name.starts_with(FILE_PREFIX) || !name.ends_with(FILE_SUFFIX) {
                continue;
            }
            let metadata = item.metadata()?;
            entries.push(DiskEntry {
                path: item.path(),
                modified: metadata.modified()?,
                len: metadata.len(),
            });
        }
        entries.sort_by_key(|entry| entry.modified);
        Ok(entries)
    }
}

fn read_document(path: &Path) -> Result<Vec<JourneyResult>, CacheError> {
    let file = fs::File::open(path)?;
    let mut decoder = GzDecoder::new(file);
    let mut text = String::new();
    decoder.read_to_string(&mut text)?;
    Ok(serde_json::from_str(&text)?)
}

/// Local calendar day of a file timestamp.
fn local_day(time: SystemTime) -> (i32, u32) {
    let time: DateTime<Local> = time.into();
    (time.year(), time.ordinal())
}
