//! Storage adapters for cache persistence
//!
//! The cache talks to persistence only through [`StorageAdapter`]. Three
//! strategies are available:
//!
//! - [`NoopStorage`]: memory-only caches, every call is a no-op.
//! - [`MediumStorage`] over [`MemoryMedium`]: ephemeral-scoped, the medium is
//!   shared in-process so a rebuilt cache on the same prefix restores its
//!   entries for the rest of the session.
//! - [`MediumStorage`] over an origin-scoped [`KeyValueMedium`] such as the
//!   SQLite medium in `anistream-infra`, which survives restarts.
//!
//! Records are JSON-encoded [`CacheEntry`] values stored under
//! `key_prefix + cache_key`.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use super::config::StorageKind;
use super::entry::CacheEntry;
use super::error::{CacheError, CacheResult};

/// Persistence strategy used by a cache
///
/// Implementations must be safe to call from any thread. A persisting cache
/// calls them from its background writer, one call at a time, in the order
/// the in-memory mutations happened.
pub trait StorageAdapter<V>: Send + Sync {
    /// Strategy implemented by this adapter
    fn kind(&self) -> StorageKind;

    /// Prefix this adapter stores records under, if it scopes them itself
    ///
    /// A cache built on the adapter adopts it as its configured key prefix.
    fn key_prefix(&self) -> Option<&str> {
        None
    }

    /// Every decodable record under this adapter's prefix, keyed by cache key
    fn load_all(&self) -> CacheResult<Vec<(String, CacheEntry<V>)>>;

    /// Write or overwrite the record for `key`
    fn save(&self, key: &str, entry: &CacheEntry<V>) -> CacheResult<()>;

    /// Delete the record for `key` if present
    fn remove(&self, key: &str) -> CacheResult<()>;

    /// Delete every record under this adapter's prefix
    fn clear(&self) -> CacheResult<()>;
}

/// Adapter for memory-only caches
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopStorage;

impl<V> StorageAdapter<V> for NoopStorage {
    fn kind(&self) -> StorageKind {
        StorageKind::Memory
    }

    fn load_all(&self) -> CacheResult<Vec<(String, CacheEntry<V>)>> {
        Ok(Vec::new())
    }

    fn save(&self, _key: &str, _entry: &CacheEntry<V>) -> CacheResult<()> {
        Ok(())
    }

    fn remove(&self, _key: &str) -> CacheResult<()> {
        Ok(())
    }

    fn clear(&self) -> CacheResult<()> {
        Ok(())
    }
}

/// String key-value medium backing a [`MediumStorage`]
///
/// Shared by many caches; each cache only touches keys under its prefix.
pub trait KeyValueMedium: Send + Sync {
    /// Every stored key starting with `prefix`
    fn keys_with_prefix(&self, prefix: &str) -> CacheResult<Vec<String>>;

    /// Value stored under `key`
    fn get(&self, key: &str) -> CacheResult<Option<String>>;

    /// Store `value` under `key`, replacing any previous value
    fn set(&self, key: &str, value: &str) -> CacheResult<()>;

    /// Delete `key`; deleting a missing key succeeds
    fn remove(&self, key: &str) -> CacheResult<()>;
}

impl<M: KeyValueMedium + ?Sized> KeyValueMedium for Arc<M> {
    fn keys_with_prefix(&self, prefix: &str) -> CacheResult<Vec<String>> {
        (**self).keys_with_prefix(prefix)
    }

    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> CacheResult<()> {
        (**self).remove(key)
    }
}

/// In-process medium for ephemeral-scoped caches
///
/// Clones share the same map, so the medium outlives any single cache built
/// on it.
#[derive(Debug, Clone, Default)]
pub struct MemoryMedium {
    records: Arc<RwLock<BTreeMap<String, String>>>,
}

impl MemoryMedium {
    /// Create an empty medium
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored records across all prefixes
    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    /// Whether the medium holds no records
    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }
}

impl KeyValueMedium for MemoryMedium {
    fn keys_with_prefix(&self, prefix: &str) -> CacheResult<Vec<String>> {
        let records = self.records.read();
        Ok(records
            .range(prefix.to_string()..)
            .take_while(|(key, _)| key.starts_with(prefix))
            .map(|(key, _)| key.clone())
            .collect())
    }

    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.records.read().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.records.write().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> CacheResult<()> {
        self.records.write().remove(key);
        Ok(())
    }
}

/// JSON-over-key-value adapter scoped to one key prefix
#[derive(Debug, Clone)]
pub struct MediumStorage<M> {
    medium: M,
    prefix: String,
    kind: StorageKind,
}

impl<M: KeyValueMedium> MediumStorage<M> {
    /// Ephemeral-scoped adapter
    pub fn session(medium: M, prefix: impl Into<String>) -> Self {
        Self { medium, prefix: prefix.into(), kind: StorageKind::Session }
    }

    /// Origin-scoped adapter
    pub fn persistent(medium: M, prefix: impl Into<String>) -> Self {
        Self { medium, prefix: prefix.into(), kind: StorageKind::Persistent }
    }

    /// Prefix prepended to every cache key
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Underlying medium
    pub fn medium(&self) -> &M {
        &self.medium
    }

    fn storage_key(&self, key: &str) -> String {
        format!("{}{}", self.prefix, key)
    }

    fn discard(&self, storage_key: &str) {
        if let Err(err) = self.medium.remove(storage_key) {
            warn!(key = storage_key, error = %err, "failed to discard unreadable cache record");
        }
    }
}

impl<V, M> StorageAdapter<V> for MediumStorage<M>
where
    V: Serialize + DeserializeOwned,
    M: KeyValueMedium,
{
    fn kind(&self) -> StorageKind {
        self.kind
    }

    fn key_prefix(&self) -> Option<&str> {
        Some(&self.prefix)
    }

    fn load_all(&self) -> CacheResult<Vec<(String, CacheEntry<V>)>> {
        let storage_keys = self.medium.keys_with_prefix(&self.prefix)?;
        let mut loaded = Vec::with_capacity(storage_keys.len());

        for storage_key in storage_keys {
            let Some(cache_key) = storage_key.strip_prefix(self.prefix.as_str()) else {
                continue;
            };

            let raw = match self.medium.get(&storage_key) {
                Ok(Some(raw)) => raw,
                Ok(None) => continue,
                Err(err) => {
                    warn!(key = %storage_key, error = %err, "failed to read cache record");
                    continue;
                }
            };

            match serde_json::from_str::<CacheEntry<V>>(&raw) {
                Ok(entry) => loaded.push((cache_key.to_string(), entry)),
                Err(err) => {
                    debug!(key = %storage_key, error = %err, "discarding malformed cache record");
                    self.discard(&storage_key);
                }
            }
        }

        Ok(loaded)
    }

    fn save(&self, key: &str, entry: &CacheEntry<V>) -> CacheResult<()> {
        let raw = serde_json::to_string(entry).map_err(|err| CacheError::serialization(key, &err))?;
        self.medium.set(&self.storage_key(key), &raw)
    }

    fn remove(&self, key: &str) -> CacheResult<()> {
        self.medium.remove(&self.storage_key(key))
    }

    fn clear(&self) -> CacheResult<()> {
        let mut first_error = None;
        for storage_key in self.medium.keys_with_prefix(&self.prefix)? {
            if let Err(err) = self.medium.remove(&storage_key) {
                first_error.get_or_insert(err);
            }
        }
        first_error.map_or(Ok(()), Err)
    }
}
