//! Two-tier journey result cache.
//!
//! Computed journeys are expensive (a shortest-path run) but only valid
//! within the travel day, since they embed the day's schedule. The cache
//! keeps a small memory tier for hot repeat queries and a compressed disk
//! tier that survives restarts. Keys are opaque strings built by the
//! caller from the query parameters.
//!
//! Invalidation rules are deliberately conservative: memory entries live
//! 30 minutes, everything is dropped on a day transition, and the disk
//! tier is bounded by age, entry count and total size so it cannot grow
//! without limit on constrained devices.

pub mod disk;
pub mod memory;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration as StdDuration;

use chrono::{DateTime, Datelike, Duration, Local};
use tokio::sync::Mutex;
use tracing::{info, warn};

use crate::domain::{Clock, JourneyResult};

pub use disk::{CacheError, DiskTier};
pub use memory::MemoryTier;

/// A cached set of journeys with its creation time.
#[derive(Debug, Clone)]
pub struct CachedJourneyEntry {
    pub journeys: Vec<JourneyResult>,
    pub timestamp: DateTime<Local>,
}

/// Limits for the journey cache.
#[derive(Debug, Clone)]
pub struct CacheConfig {
    /// Directory holding the disk tier.
    pub dir: PathBuf,

    /// Maximum number of memory-tier entries.
    pub memory_capacity: u64,

    /// How long a memory-tier entry stays trusted.
    pub memory_validity: Duration,

    /// Maximum number of disk-tier files.
    pub disk_max_entries: usize,

    /// Maximum total size of the disk tier in bytes.
    pub disk_max_bytes: u64,

    /// Disk entries older than this are swept regardless of count/size.
    pub disk_max_age: StdDuration,

    /// How many disk entries to promote into memory at startup.
    pub preload_count: usize,
}

impl CacheConfig {
    /// Default limits under the given cache directory.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            memory_capacity: 50,
            memory_validity: Duration::minutes(30),
            disk_max_entries: 200,
            disk_max_bytes: 5 * 1024 * 1024,
            disk_max_age: StdDuration::from_secs(24 * 60 * 60),
            preload_count: 30,
        }
    }
}

/// Two-tier journey cache: memory in front, compressed disk behind.
pub struct JourneyCache {
    memory: MemoryTier,
    disk: DiskTier,
    /// Serializes disk-tier read/write/sweep sequences so eviction never
    /// races a concurrent read or write.
    disk_lock: Arc<Mutex<()>>,
    clock: Arc<dyn Clock>,
    preload_count: usize,
}

impl JourneyCache {
    pub fn new(config: CacheConfig, clock: Arc<dyn Clock>) -> Self {
        Self {
            memory: MemoryTier::new(
                config.memory_capacity,
                config.memory_validity,
                clock.clone(),
            ),
            disk: DiskTier::new(
                config.dir,
                config.disk_max_entries,
                config.disk_max_bytes,
                config.disk_max_age,
            ),
            disk_lock: Arc::new(Mutex::new(())),
            clock,
            preload_count: config.preload_count,
        }
    }

    /// The current local (year, day-of-year), the disk validity unit.
    fn today(&self) -> (i32, u32) {
        let now = self.clock.now();
        (now.year(), now.ordinal())
    }

    /// Cached journeys for `key`, consulting memory then disk. A disk hit
    /// is promoted into the memory tier before returning.
    pub async fn get(&self, key: &str) -> Option<Vec<JourneyResult>> {
        if let Some(entry) = self.memory.get(key).await {
            return Some(entry.journeys.clone());
        }

        let journeys = {
            let _guard = self.disk_lock.lock().await;
            let disk = self.disk.clone();
            let owned_key = key.to_string();
            let today = self.today();
            match tokio::task::spawn_blocking(move || disk.read(&owned_key, today)).await {
                Ok(found) => found?,
                Err(error) => {
                    warn!(%error, "cache disk read task failed");
                    return None;
                }
            }
        };

        let entry = Arc::new(CachedJourneyEntry {
            journeys: journeys.clone(),
            timestamp: self.clock.now(),
        });
        self.memory.put(key.to_string(), entry).await;
        Some(journeys)
    }

    /// Stores journeys under `key`: into memory synchronously, onto disk
    /// in a detached task. A failed disk persist is logged and absorbed —
    /// the write itself never fails.
    pub async fn put(&self, key: &str, journeys: Vec<JourneyResult>) {
        let entry = Arc::new(CachedJourneyEntry {
            journeys,
            timestamp: self.clock.now(),
        });
        self.memory.put(key.to_string(), entry.clone()).await;

        let disk = self.disk.clone();
        let lock = self.disk_lock.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            let _guard = lock.lock().await;
            let result =
                tokio::task::spawn_blocking(move || disk.write(&key, &entry.journeys)).await;
            match result {
                Ok(Ok(())) => {}
                Ok(Err(error)) => warn!(%error, "journey cache disk persist failed"),
                Err(error) => warn!(%error, "journey cache disk task failed"),
            }
        });
    }

    /// Sweeps the disk tier: age, count and size limits.
    pub async fn cleanup_expired(&self) {
        let _guard = self.disk_lock.lock().await;
        let disk = self.disk.clone();
        match tokio::task::spawn_blocking(move || disk.evict()).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => warn!(%error, "journey cache sweep failed"),
            Err(error) => warn!(%error, "journey cache sweep task failed"),
        }
    }

    /// Promotes the most recent disk entries into the memory tier.
    /// Called once at startup to cut first-query latency; every failure
    /// is non-fatal. Returns how many entries were loaded.
    pub async fn preload(&self) -> usize {
        let _guard = self.disk_lock.lock().await;

        let disk = self.disk.clone();
        let count = self.preload_count;
        let recent = match tokio::task::spawn_blocking(move || disk.recent(count)).await {
            Ok(recent) => recent,
            Err(error) => {
                warn!(%error, "cache preload listing failed");
                return 0;
            }
        };

        let today = self.today();
        let reads = recent.into_iter().map(|(key, path)| {
            let disk = self.disk.clone();
            async move {
                let journeys = tokio::task::spawn_blocking(move || disk.read_path(&path, today))
                    .await
                    .ok()
                    .flatten()?;
                Some((key, journeys))
            }
        });

        let mut loaded = 0;
        for item in futures::future::join_all(reads).await.into_iter().flatten() {
            let (key, journeys) = item;
            if self.memory.contains(&key) {
                continue;
            }
            let entry = Arc::new(CachedJourneyEntry {
                journeys,
                timestamp: self.clock.now(),
            });
            self.memory.put(key, entry).await;
            loaded += 1;
        }
        if loaded > 0 {
            info!(loaded, "preloaded journey cache entries");
        }
        loaded
    }

    /// Empties both tiers unconditionally. Used when upstream schedule
    /// data changes and every cached journey must be distrusted.
    pub async fn clear_all(&self) {
        self.memory.clear();

        let _guard = self.disk_lock.lock().await;
        let disk = self.disk.clone();
        match tokio::task::spawn_blocking(move || disk.clear()).await {
            Ok(Ok(())) => {}
            Ok(Err(error)) => warn!(%error, "journey cache disk clear failed"),
            Err(error) => warn!(%error, "journey cache clear task failed"),
        }
    }

    pub fn memory_entry_count(&self) -> u64 {
        self.memory.entry_count()
    }

    pub fn disk_entry_count(&self) -> usize {
        self.disk.entry_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{JourneyLeg, ManualClock, SystemClock};
    use chrono::{TimeZone, Timelike};
    use tempfile::tempdir;

    fn journeys(tag: &str) -> Vec<JourneyResult> {
        vec![JourneyResult {
            departure_time: 1000,
            arrival_time: 1700,
            legs: vec![JourneyLeg {
                from_stop_id: format!("{tag}:0"),
                from_stop_name: "Perrache".to_string(),
                to_stop_id: format!("{tag}:1"),
                to_stop_name: "Part-Dieu".to_string(),
                departure_time: 1000,
                arrival_time: 1700,
                route_name: None,
                route_color: None,
                is_walking: false,
                direction: None,
                intermediate_stops: Vec::new(),
            }],
        }]
    }

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let dir = tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(
            Local.with_ymd_and_hms(2026, 3, 16, 10, 0, 0).unwrap(),
        ));
        let cache = JourneyCache::new(CacheConfig::new(dir.path()), clock);

        cache.put("morning_peak:0:2", journeys("a")).await;
        let loaded = cache.get("morning_peak:0:2").await.unwrap();
        assert_eq!(loaded, journeys("a"));
    }

    #[tokio::test]
    async fn miss_is_none() {
        let dir = tempdir().unwrap();
        let cache = JourneyCache::new(CacheConfig::new(dir.path()), Arc::new(SystemClock));

        assert!(cache.get("never-stored").await.is_none());
    }

    #[tokio::test]
    async fn expired_memory_entry_falls_back_to_disk() {
        let dir = tempdir().unwrap();
        // anchor the simulated clock to the real day so disk mtimes agree
        let start = Local::now()
            .with_hour(12)
            .and_then(|t| t.with_minute(0))
            .unwrap();
        let clock = Arc::new(ManualClock::new(start));
        let cache = JourneyCache::new(CacheConfig::new(dir.path()), clock.clone());

        // seed both tiers directly so there is no detached write to race
        cache
            .memory
            .put(
                "k".to_string(),
                Arc::new(CachedJourneyEntry {
                    journeys: journeys("a"),
                    timestamp: clock.now(),
                }),
            )
            .await;
        cache.disk.write("k", &journeys("a")).unwrap();

        // age the memory entry past its window, same travel day
        clock.advance(Duration::minutes(31));

        let loaded = cache.get("k").await.unwrap();
        assert_eq!(loaded, journeys("a"));
        // the disk hit was promoted back into memory
        assert!(cache.memory.get("k").await.is_some());
    }

    #[tokio::test]
    async fn day_rollover_invalidates_everything() {
        let dir = tempdir().unwrap();
        let clock = Arc::new(ManualClock::new(
            Local.with_ymd_and_hms(2026, 3, 16, 23, 50, 0).unwrap(),
        ));
        let cache = JourneyCache::new(CacheConfig::new(dir.path()), clock.clone());

        cache.memory
            .put(
                "k".to_string(),
                Arc::new(CachedJourneyEntry {
                    journeys: journeys("a"),
                    timestamp: clock.now(),
                }),
            )
            .await;
        cache.disk.write("k", &journeys("a")).unwrap();

        // 20 minutes later it is tomorrow; the entry is barely aged but
        // yesterday's schedule no longer applies
        clock.advance(Duration::minutes(20));
        assert!(cache.get("k").await.is_none());
    }

    #[tokio::test]
    async fn preload_promotes_recent_disk_entries() {
        let dir = tempdir().unwrap();
        let cache = JourneyCache::new(CacheConfig::new(dir.path()), Arc::new(SystemClock));

        cache.disk.write("evening:0:1", &journeys("a")).unwrap();
        cache.disk.write("evening:1:2", &journeys("b")).unwrap();

        let loaded = cache.preload().await;
        assert_eq!(loaded, 2);
        assert!(cache.memory.contains("evening:0:1"));
        assert!(cache.memory.contains("evening:1:2"));
    }

    #[tokio::test]
    async fn preload_skips_keys_already_in_memory() {
        let dir = tempdir().unwrap();
        let cache = JourneyCache::new(CacheConfig::new(dir.path()), Arc::new(SystemClock));

        cache.put("k", journeys("mem")).await;
        cache.disk.write("k", &journeys("disk")).unwrap();

        cache.preload().await;
        // the in-memory version wins
        assert_eq!(cache.get("k").await.unwrap(), journeys("mem"));
    }

    #[tokio::test]
    async fn clear_all_empties_both_tiers() {
        let dir = tempdir().unwrap();
        let cache = JourneyCache::new(CacheConfig::new(dir.path()), Arc::new(SystemClock));

        cache.put("k", journeys("a")).await;
        cache.disk.write("on-disk", &journeys("b")).unwrap();

        cache.clear_all().await;
        assert!(cache.get("k").await.is_none());
        assert!(cache.get("on-disk").await.is_none());
        assert_eq!(cache.disk_entry_count(), 0);
    }
}
