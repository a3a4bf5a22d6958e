//! Cache entry record
//!
//! The same struct is held in memory and written to storage media, so its
//! serialized form is the persisted record layout.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::utils::serde::duration_millis;

/// A cached value together with its expiry and access metadata
///
/// Timestamps are milliseconds since the UNIX epoch. An entry is valid while
/// `now - created_at < ttl`.
///
/// Serialized field names are camelCase:
/// `{ "data", "createdAt", "ttl", "accessCount", "lastAccessedAt", "tags" }`
/// with `ttl` in milliseconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheEntry<V> {
    /// The cached value
    pub data: V,

    /// Insertion time (ms since epoch)
    pub created_at: u64,

    /// Time-to-live measured from `created_at`
    #[serde(with = "duration_millis")]
    pub ttl: Duration,

    /// Number of successful reads
    pub access_count: u64,

    /// Time of the last successful read, or `created_at` if never read
    pub last_accessed_at: u64,

    /// Labels used for group invalidation
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl<V> CacheEntry<V> {
    /// Create a fresh entry stamped at `now`
    pub fn new(data: V, now: u64, ttl: Duration, tags: BTreeSet<String>) -> Self {
        Self { data, created_at: now, ttl, access_count: 0, last_accessed_at: now, tags }
    }

    fn ttl_millis(&self) -> u64 {
        u64::try_from(self.ttl.as_millis()).unwrap_or(u64::MAX)
    }

    /// Whether the entry is expired at `now`
    ///
    /// A clock that moved backwards past `created_at` keeps the entry valid.
    pub fn is_expired_at(&self, now: u64) -> bool {
        now.saturating_sub(self.created_at) >= self.ttl_millis()
    }

    /// Expiry instant in ms since epoch
    pub fn expires_at(&self) -> u64 {
        self.created_at.saturating_add(self.ttl_millis())
    }

    /// Time since creation
    pub fn age_at(&self, now: u64) -> Duration {
        Duration::from_millis(now.saturating_sub(self.created_at))
    }

    /// Whether the entry carries `tag`
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.contains(tag)
    }

    /// Record a successful read
    pub(crate) fn touch(&mut self, now: u64) {
        self.access_count = self.access_count.saturating_add(1);
        self.last_accessed_at = now;
    }
}
