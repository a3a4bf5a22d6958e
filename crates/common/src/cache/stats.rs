//! Cache statistics and metrics tracking
//!
//! A [`CacheStats`] snapshot combines what is derived from the entries
//! currently held (size, memory estimate, ages, access totals) with
//! lifetime counters kept by [`MetricsCollector`].

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Snapshot of cache state and counters
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CacheStats {
    /// Current number of entries, including expired ones awaiting a sweep
    pub size: usize,

    /// Configured capacity
    pub max_size: usize,

    /// Estimated footprint: key lengths plus JSON-encoded entry lengths
    pub memory_usage_bytes: usize,

    /// Mean time since creation across held entries
    pub average_age: Duration,

    /// Sum of per-entry read counts
    pub total_accesses: u64,

    /// Reads that returned a value
    pub hits: u64,

    /// Reads that found nothing or an expired entry
    pub misses: u64,

    /// Writes
    pub inserts: u64,

    /// Entries dropped to make room
    pub evictions: u64,

    /// Entries dropped because their TTL ran out
    pub expirations: u64,
}

impl CacheStats {
    /// Calculate hit rate (hits / lookups)
    pub fn hit_rate(&self) -> f64 {
        let total = self.lookups();
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }

    /// Calculate fill percentage (size / max_size)
    pub fn fill_percentage(&self) -> f64 {
        if self.max_size == 0 {
            0.0
        } else {
            self.size as f64 / self.max_size as f64
        }
    }

    /// Total number of reads (hits + misses)
    pub fn lookups(&self) -> u64 {
        self.hits + self.misses
    }
}

/// Lock-free lifetime counters for one cache
#[derive(Debug, Default)]
pub(crate) struct MetricsCollector {
    hits: AtomicU64,
    misses: AtomicU64,
    inserts: AtomicU64,
    evictions: AtomicU64,
    expirations: AtomicU64,
}

impl MetricsCollector {
    pub(crate) fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_insert(&self) {
        self.inserts.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_eviction(&self) {
        self.evictions.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_expirations(&self, count: usize) {
        self.expirations.fetch_add(count as u64, Ordering::Relaxed);
    }

    /// Fill the counter fields of `stats`
    pub(crate) fn snapshot(&self, stats: CacheStats) -> CacheStats {
        CacheStats {
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
            inserts: self.inserts.load(Ordering::Relaxed),
            evictions: self.evictions.load(Ordering::Relaxed),
            expirations: self.expirations.load(Ordering::Relaxed),
            ..stats
        }
    }
}
