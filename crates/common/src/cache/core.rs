//! Core cache implementation
//!
//! [`Cache`] is a cheap-to-clone handle over shared state: an unbounded
//! `LruCache` that holds both the entries and their recency order, the tag
//! index, lifetime counters and the persistence writer. Every mutation runs
//! under one write lock and queues its storage change before releasing it,
//! so storage sees changes in memory order. A background writer applies
//! them; failures are logged, never returned.

use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use lru::LruCache;
use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::config::{CacheConfig, EntryOptions, StorageKind};
use super::entry::CacheEntry;
use super::flight::InFlight;
use super::stats::{CacheStats, MetricsCollector};
use super::storage::{NoopStorage, StorageAdapter};
use super::tags::TagIndex;
use super::writer::{PersistOp, PersistWriter};
use crate::time::{Clock, SystemClock};

/// Bounds every cached value type satisfies
pub trait CacheValue: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

/// Entries and their tag index, guarded together
struct CacheState<V> {
    /// Iteration order is most to least recently used
    entries: LruCache<String, CacheEntry<V>>,
    tags: TagIndex,
}

impl<V> CacheState<V> {
    fn remove(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.pop(key)?;
        self.tags.remove(key, &entry.tags);
        Some(entry)
    }

    fn expired_keys(&self, now: u64) -> Vec<String> {
        self.entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect()
    }
}

pub(crate) struct Shared<V, C> {
    state: RwLock<CacheState<V>>,
    storage: Arc<dyn StorageAdapter<V>>,
    writer: PersistWriter<V>,
    config: CacheConfig,
    metrics: MetricsCollector,
    in_flight: InFlight,
    clock: C,
}

enum Lookup<V> {
    Hit(V),
    Expired,
    Missing,
}

/// Typed TTL + LRU cache with tag invalidation and pluggable persistence
///
/// Handles are cheap to clone and share one cache. Dropping the last handle
/// of a persisting cache waits until its queued writes have been applied.
///
/// # Type Parameters
/// - `V`: Value type, stored by value and returned as clones
/// - `C`: Clock type for time-based operations (defaults to `SystemClock`)
///
/// # Example
/// ```
/// use std::time::Duration;
///
/// use anistream_common::cache::{Cache, CacheConfig, EntryOptions};
///
/// let cache: Cache<String> = Cache::new(CacheConfig::new(100, Duration::from_secs(300)));
/// cache.set_with(
///     "anime:21",
///     "One Piece".to_string(),
///     EntryOptions::new().tag("genre:adventure"),
/// );
///
/// assert_eq!(cache.get("anime:21").as_deref(), Some("One Piece"));
/// assert_eq!(cache.invalidate_by_tag("genre:adventure"), 1);
/// assert!(!cache.has("anime:21"));
/// ```
pub struct Cache<V, C = SystemClock>
where
    V: CacheValue,
    C: Clock,
{
    pub(crate) inner: Arc<Shared<V, C>>,
}

impl<V: CacheValue> Cache<V, SystemClock> {
    /// Create a memory-only cache using the system clock
    pub fn new(config: CacheConfig) -> Self {
        Self::with_clock(config, Arc::new(NoopStorage), SystemClock)
    }

    /// Create a cache persisted through `storage`, restoring its entries
    pub fn with_storage(config: CacheConfig, storage: Arc<dyn StorageAdapter<V>>) -> Self {
        Self::with_clock(config, storage, SystemClock)
    }
}

impl<V, C> Cache<V, C>
where
    V: CacheValue,
    C: Clock,
{
    /// Create a cache with a custom clock (useful for testing)
    ///
    /// The adapter decides the storage kind and, when it scopes its records
    /// itself, the key prefix; the configured values are overridden.
    ///
    /// When the adapter persists, previously saved entries are loaded here:
    /// valid ones are admitted oldest access first so recency is restored,
    /// expired ones are removed from storage. A failed load is logged and
    /// the cache starts empty.
    pub fn with_clock(config: CacheConfig, storage: Arc<dyn StorageAdapter<V>>, clock: C) -> Self {
        let mut config = config;
        let kind = storage.kind();
        if config.storage != kind {
            debug!(
                prefix = %config.key_prefix,
                configured = %config.storage,
                actual = %kind,
                "storage adapter overrides configured storage kind"
            );
            config.storage = kind;
        }
        if let Some(prefix) = storage.key_prefix() {
            if config.key_prefix != prefix {
                debug!(
                    configured = %config.key_prefix,
                    actual = prefix,
                    "storage adapter overrides configured key prefix"
                );
                config.key_prefix = prefix.to_string();
            }
        }
        if let Err(err) = config.validate() {
            warn!(prefix = %config.key_prefix, error = %err, "invalid cache configuration, clamping");
        }
        let config = config.normalized();

        let writer = if kind.is_persisted() {
            PersistWriter::spawn(Arc::clone(&storage), &config.key_prefix)
        } else {
            PersistWriter::inline(Arc::clone(&storage))
        };

        let cache = Self {
            inner: Arc::new(Shared {
                state: RwLock::new(CacheState {
                    entries: LruCache::unbounded(),
                    tags: TagIndex::new(),
                }),
                storage,
                writer,
                config,
                metrics: MetricsCollector::default(),
                in_flight: InFlight::default(),
                clock,
            }),
        };

        if kind.is_persisted() {
            cache.restore();
        }
        cache
    }

    fn restore(&self) {
        let loaded = match self.inner.storage.load_all() {
            Ok(loaded) => loaded,
            Err(err) => {
                warn!(
                    prefix = %self.inner.config.key_prefix,
                    error = %err,
                    "failed to load persisted cache entries, starting empty"
                );
                return;
            }
        };

        let now = self.now();
        let (mut live, expired): (Vec<_>, Vec<_>) =
            loaded.into_iter().partition(|(_, entry)| !entry.is_expired_at(now));
        live.sort_by_key(|(_, entry)| entry.last_accessed_at);

        let restored = live.len();
        let discarded = expired.len();
        let mut evicted = 0_usize;
        {
            let mut state = self.inner.state.write();
            for (key, _) in expired {
                self.persist_remove(key);
            }
            for (key, entry) in live {
                if let Some(lru_key) = self.admit(&mut state, key, entry) {
                    self.persist_remove(lru_key);
                    evicted += 1;
                }
            }
        }

        debug!(
            prefix = %self.inner.config.key_prefix,
            restored,
            discarded,
            evicted,
            "restored cache entries from storage"
        );
    }

    fn now(&self) -> u64 {
        self.inner.clock.millis_since_epoch()
    }

    /// Insert under the lock, returning the key evicted to make room
    fn admit(&self, state: &mut CacheState<V>, key: String, entry: CacheEntry<V>) -> Option<String> {
        let mut evicted = None;
        if state.remove(&key).is_none() && state.entries.len() >= self.inner.config.max_size {
            if let Some((lru_key, lru_entry)) = state.entries.pop_lru() {
                state.tags.remove(&lru_key, &lru_entry.tags);
                self.inner.metrics.record_eviction();
                debug!(key = %lru_key, "evicted least recently used entry");
                evicted = Some(lru_key);
            }
        }
        state.tags.insert(&key, &entry.tags);
        state.entries.put(key, entry);
        evicted
    }

    // The persist_* helpers must run with the state write lock held

    fn persist_save(&self, key: String, entry: CacheEntry<V>) {
        self.inner.writer.submit(PersistOp::Save(key, entry));
    }

    fn persist_remove(&self, key: String) {
        if self.persists() {
            self.inner.writer.submit(PersistOp::Remove(key));
        }
    }

    fn persists(&self) -> bool {
        self.inner.config.storage.is_persisted()
    }

    /// Block until every storage change made so far has reached the medium
    ///
    /// Writes are applied in the background, in the order the cache made
    /// them. Memory-only caches return immediately.
    pub fn flush(&self) {
        self.inner.writer.flush();
    }

    /// Insert or overwrite `key` with the default TTL and no tags
    pub fn set(&self, key: impl Into<String>, value: V) {
        self.set_with(key, value, EntryOptions::default());
    }

    /// Insert or overwrite `key`
    ///
    /// A new key arriving at capacity evicts the least recently used entry
    /// first. The written key becomes the most recently used.
    pub fn set_with(&self, key: impl Into<String>, value: V, options: EntryOptions) {
        let key = key.into();
        let ttl = options.ttl.unwrap_or(self.inner.config.default_ttl);
        let entry = CacheEntry::new(value, self.now(), ttl, options.tags);
        let persisted = self.persists().then(|| (key.clone(), entry.clone()));

        {
            let mut state = self.inner.state.write();
            if let Some(evicted) = self.admit(&mut state, key, entry) {
                self.persist_remove(evicted);
            }
            if let Some((key, entry)) = persisted {
                self.persist_save(key, entry);
            }
        }
        self.inner.metrics.record_insert();
    }

    fn lookup(&self, key: &str) -> Lookup<V> {
        let now = self.now();
        let mut state = self.inner.state.write();
        let lookup = match state.entries.get_mut(key) {
            None => Lookup::Missing,
            Some(entry) if entry.is_expired_at(now) => Lookup::Expired,
            Some(entry) => {
                entry.touch(now);
                Lookup::Hit(entry.data.clone())
            }
        };

        if matches!(lookup, Lookup::Expired) {
            state.remove(key);
            self.persist_remove(key.to_string());
            drop(state);
            self.inner.metrics.record_expirations(1);
        }
        lookup
    }

    /// Value under `key` if present and not expired
    ///
    /// A hit bumps the access count and makes the key most recently used. An
    /// expired entry is deleted along with its persisted copy.
    pub fn get(&self, key: &str) -> Option<V> {
        match self.lookup(key) {
            Lookup::Hit(value) => {
                self.inner.metrics.record_hit();
                Some(value)
            }
            Lookup::Expired | Lookup::Missing => {
                self.inner.metrics.record_miss();
                None
            }
        }
    }

    /// Whether `key` holds a valid entry, without touching recency
    pub fn has(&self, key: &str) -> bool {
        let now = self.now();
        let mut state = self.inner.state.write();
        let expired = match state.entries.peek(key) {
            None => return false,
            Some(entry) => entry.is_expired_at(now),
        };
        if !expired {
            return true;
        }

        state.remove(key);
        self.persist_remove(key.to_string());
        drop(state);
        self.inner.metrics.record_expirations(1);
        false
    }

    /// Cache-aside read with an async factory
    ///
    /// A hit never calls `factory`. On a miss the factory's value is stored
    /// with `options` and returned; its error is returned unchanged and
    /// nothing is stored. Concurrent misses on one key each run their own
    /// factory and the last write wins; see
    /// [`get_or_set_coalesced`](Self::get_or_set_coalesced) for a
    /// deduplicating variant.
    pub async fn get_or_set<F, Fut, E>(
        &self,
        key: &str,
        factory: F,
        options: EntryOptions,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = factory().await?;
        self.set_with(key, value.clone(), options);
        Ok(value)
    }

    /// Cache-aside read with a synchronous factory
    ///
    /// # Example
    /// ```
    /// use anistream_common::cache::{Cache, CacheConfig, EntryOptions};
    ///
    /// let cache: Cache<u32> = Cache::new(CacheConfig::default());
    /// let value = cache
    ///     .get_or_set_with("answer", || Ok::<_, std::io::Error>(42), EntryOptions::default())
    ///     .unwrap();
    /// assert_eq!(value, 42);
    /// ```
    pub fn get_or_set_with<F, E>(&self, key: &str, factory: F, options: EntryOptions) -> Result<V, E>
    where
        F: FnOnce() -> Result<V, E>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }
        let value = factory()?;
        self.set_with(key, value.clone(), options);
        Ok(value)
    }

    /// Cache-aside read that runs at most one factory per key at a time
    ///
    /// Callers missing on the same key queue behind the first one. When it
    /// stores a value the others return it without calling their factories;
    /// when it fails or is cancelled the next caller in line runs its own
    /// factory.
    pub async fn get_or_set_coalesced<F, Fut, E>(
        &self,
        key: &str,
        factory: F,
        options: EntryOptions,
    ) -> Result<V, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        if let Some(value) = self.get(key) {
            return Ok(value);
        }

        let flight = self.inner.in_flight.join(key);
        let _turn = flight.turn().await;
        if let Lookup::Hit(value) = self.lookup(key) {
            self.inner.metrics.record_hit();
            return Ok(value);
        }
        let value = factory().await?;
        self.set_with(key, value.clone(), options);
        Ok(value)
    }

    /// Remove `key`, returning whether an entry existed
    pub fn delete(&self, key: &str) -> bool {
        let mut state = self.inner.state.write();
        let removed = state.remove(key).is_some();
        if removed {
            self.persist_remove(key.to_string());
        }
        removed
    }

    /// Remove every entry and purge this cache's persisted records
    pub fn clear(&self) {
        let mut state = self.inner.state.write();
        state.entries.clear();
        state.tags.clear();
        self.inner.writer.submit(PersistOp::Clear);
    }

    /// Remove every entry carrying `tag`, returning how many were removed
    pub fn invalidate_by_tag(&self, tag: &str) -> usize {
        let removed = {
            let mut state = self.inner.state.write();
            let mut removed = 0_usize;
            for key in state.tags.keys_for(tag) {
                if state.remove(&key).is_some() {
                    self.persist_remove(key);
                    removed += 1;
                }
            }
            removed
        };
        if removed > 0 {
            debug!(tag, count = removed, "invalidated tagged cache entries");
        }
        removed
    }

    /// Remove every expired entry, returning how many were removed
    pub fn cleanup(&self) -> usize {
        let now = self.now();
        let removed = {
            let mut state = self.inner.state.write();
            let expired = state.expired_keys(now);
            for key in &expired {
                state.remove(key);
            }
            let removed = expired.len();
            for key in expired {
                self.persist_remove(key);
            }
            removed
        };
        self.inner.metrics.record_expirations(removed);
        if removed > 0 {
            debug!(prefix = %self.inner.config.key_prefix, count = removed, "swept expired cache entries");
        }
        removed
    }

    /// Snapshot of size, footprint, ages, access totals and counters
    pub fn stats(&self) -> CacheStats {
        let now = self.now();
        let state = self.inner.state.read();

        let mut memory_usage_bytes = 0_usize;
        let mut total_age_ms = 0_u64;
        let mut total_accesses = 0_u64;
        for (key, entry) in state.entries.iter() {
            let encoded = serde_json::to_vec(entry).map(|bytes| bytes.len()).unwrap_or(0);
            memory_usage_bytes = memory_usage_bytes.saturating_add(key.len() + encoded);
            total_age_ms = total_age_ms.saturating_add(now.saturating_sub(entry.created_at));
            total_accesses = total_accesses.saturating_add(entry.access_count);
        }

        let size = state.entries.len();
        let average_age = match u64::try_from(size) {
            Ok(count) if count > 0 => Duration::from_millis(total_age_ms / count),
            _ => Duration::ZERO,
        };
        drop(state);

        self.inner.metrics.snapshot(CacheStats {
            size,
            max_size: self.inner.config.max_size,
            memory_usage_bytes,
            average_age,
            total_accesses,
            ..CacheStats::default()
        })
    }

    fn collect_valid<T>(&self, map: impl Fn(&String, &CacheEntry<V>) -> T) -> Vec<T> {
        let now = self.now();
        let state = self.inner.state.read();
        let collected = state
            .entries
            .iter()
            .rev()
            .filter(|(_, entry)| !entry.is_expired_at(now))
            .map(|(key, entry)| map(key, entry))
            .collect();
        collected
    }

    /// Keys of valid entries, least to most recently used
    pub fn keys(&self) -> Vec<String> {
        self.collect_valid(|key, _| key.clone())
    }

    /// Values of valid entries, least to most recently used
    pub fn values(&self) -> Vec<V> {
        self.collect_valid(|_, entry| entry.data.clone())
    }

    /// Key-value pairs of valid entries, least to most recently used
    pub fn entries(&self) -> Vec<(String, V)> {
        self.collect_valid(|key, entry| (key.clone(), entry.data.clone()))
    }

    /// Number of held entries, including expired ones awaiting a sweep
    pub fn len(&self) -> usize {
        self.inner.state.read().entries.len()
    }

    /// Whether the cache holds no entries
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Effective configuration
    pub fn config(&self) -> &CacheConfig {
        &self.inner.config
    }

    /// Persistence strategy in use
    pub fn storage_kind(&self) -> StorageKind {
        self.inner.config.storage
    }
}

impl<V, C> Clone for Cache<V, C>
where
    V: CacheValue,
    C: Clock,
{
    fn clone(&self) -> Self {
        Self { inner: Arc::clone(&self.inner) }
    }
}

impl<V, C> fmt::Debug for Cache<V, C>
where
    V: CacheValue,
    C: Clock,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Cache")
            .field("key_prefix", &self.inner.config.key_prefix)
            .field("storage", &self.inner.config.storage)
            .field("len", &self.len())
            .field("max_size", &self.inner.config.max_size)
            .finish()
    }
}
