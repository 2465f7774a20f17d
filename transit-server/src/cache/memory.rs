//! In-memory journey cache tier.
//!
//! Bounded, recency-evicting map of recently computed journeys. Entries
//! are only trusted for a short window: the memory tier answers repeat
//! queries within a session, while the disk tier carries entries across
//! restarts for the rest of the travel day.
//!
//! Freshness is enforced by an explicit timestamp check against the
//! injected clock rather than a wall-time TTL, so expiry is exact under
//! a simulated clock.

use std::sync::{Arc, Mutex};

use chrono::{Datelike, Duration};
use moka::future::Cache as MokaCache;
use tracing::info;

use crate::domain::Clock;

use super::CachedJourneyEntry;

/// Bounded memory tier with a freshness window and a day-transition clear.
pub struct MemoryTier {
    entries: MokaCache<String, Arc<CachedJourneyEntry>>,
    validity: Duration,
    clock: Arc<dyn Clock>,
    /// Last (year, day-of-year) observed; the whole tier is cleared once
    /// when it changes, since journeys depend on the day's schedule.
    last_day: Mutex<Option<(i32, u32)>>,
}

impl MemoryTier {
    pub fn new(capacity: u64, validity: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: MokaCache::builder().max_capacity(capacity).build(),
            validity,
            clock,
            last_day: Mutex::new(None),
        }
    }

    /// Clears the tier if the local calendar day changed since the last
    /// check. Runs at the start of every read and write.
    pub fn roll_day(&self) {
        let now = self.clock.now();
        let today = (now.year(), now.ordinal());

        let mut guard = self.last_day.lock().unwrap();
        match *guard {
            Some(day) if day == today => {}
            Some(_) => {
                self.entries.invalidate_all();
                *guard = Some(today);
                info!("travel day changed, cleared journey memory cache");
            }
            None => *guard = Some(today),
        }
    }

    /// Fresh entry for `key`, if present and within the validity window.
    /// Entries past the window are evicted and reported as absent.
    pub async fn get(&self, key: &str) -> Option<Arc<CachedJourneyEntry>> {
        self.roll_day();

        let entry = self.entries.get(key).await?;
        let age = self.clock.now().signed_duration_since(entry.timestamp);
        if age > self.validity {
            self.entries.invalidate(key).await;
            return None;
        }
        Some(entry)
    }

    pub async fn put(&self, key: String, entry: Arc<CachedJourneyEntry>) {
        self.roll_day();
        self.entries.insert(key, entry).await;
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn clear(&self) {
        self.entries.invalidate_all();
    }

    pub fn entry_count(&self) -> u64 {
        self.entries.entry_count()
    }
}
