// --- File: crates/agendar_widget/src/cache.rs ---
//! Day-availability cache with an explicit TTL.
//!
//! The clock is always passed in by the caller, so expiry is testable
//! without waiting on wall time. Last writer for a date key wins.

use std::collections::HashMap;
use std::time::Duration;

use chrono::{DateTime, Utc};

use agendar_availability::models::DayAvailability;
use agendar_config::CacheConfig;

pub const DEFAULT_TTL: Duration = Duration::from_secs(300);

struct CacheEntry {
    day: DayAvailability,
    inserted_at: DateTime<Utc>,
}

/// TTL cache for per-date availability, keyed by `YYYY-MM-DD`.
pub struct AvailabilityCache {
    ttl: Duration,
    entries: HashMap<String, CacheEntry>,
}

impl AvailabilityCache {
    pub fn new(ttl: Duration) -> Self {
        AvailabilityCache {
            ttl,
            entries: HashMap::new(),
        }
    }

    /// TTL taken from the `cache` configuration section, 300s when unset.
    pub fn from_config(config: &CacheConfig) -> Self {
        let ttl = config
            .ttl_seconds
            .map(Duration::from_secs)
            .unwrap_or(DEFAULT_TTL);
        AvailabilityCache::new(ttl)
    }

    /// The cached day for `date`, unless the entry has outlived the TTL.
    /// Expired entries are evicted on access.
    pub fn get(&mut self, date: &str, now: DateTime<Utc>) -> Option<&DayAvailability> {
        let fresh = match self.entries.get(date) {
            Some(entry) => now.signed_duration_since(entry.inserted_at).to_std()
                .map(|age| age < self.ttl)
                .unwrap_or(true),
            None => return None,
        };
        if !fresh {
            self.entries.remove(date);
            return None;
        }
        self.entries.get(date).map(|entry| &entry.day)
    }

    pub fn insert(&mut self, date: impl Into<String>, day: DayAvailability, now: DateTime<Utc>) {
        self.entries.insert(
            date.into(),
            CacheEntry {
                day,
                inserted_at: now,
            },
        );
    }

    /// Forcibly evict a date, e.g. after a successful booking or a manual
    /// refresh.
    pub fn invalidate(&mut self, date: &str) {
        self.entries.remove(date);
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for AvailabilityCache {
    fn default() -> Self {
        AvailabilityCache::new(DEFAULT_TTL)
    }
}
