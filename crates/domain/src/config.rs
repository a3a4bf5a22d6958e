//! Configuration structures for the cache layer
//!
//! Every field has a default equal to the production registry table, so a
//! partial file (or no file at all) yields a working configuration. Defaults
//! apply per field and per domain: a `[cache.search]` section that only sets
//! `ttl_secs` keeps search's own size and backend. Durations are expressed in
//! seconds to keep files and environment variables readable.

use serde::{Deserialize, Serialize};

use crate::constants::{
    ANIME_CACHE_MAX_SIZE, ANIME_CACHE_TTL_SECS, CACHE_CLEANUP_INTERVAL_SECS,
    DEFAULT_CACHE_DB_PATH, EPISODES_CACHE_MAX_SIZE, EPISODES_CACHE_TTL_SECS,
    IMAGES_CACHE_MAX_SIZE, IMAGES_CACHE_TTL_SECS, SEARCH_CACHE_MAX_SIZE, SEARCH_CACHE_TTL_SECS,
};
use crate::errors::{AniStreamError, Result};
use crate::impl_domain_status_conversions;

/// Top-level application configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub cache: CacheSettings,
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Check every section
    ///
    /// # Errors
    /// Returns `AniStreamError::Config` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        self.cache.validate()
    }
}

/// Where a domain cache keeps its write-through copy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    /// Nothing is persisted
    Memory,
    /// Lives as long as the process
    Session,
    /// Survives restarts
    Persistent,
}

impl_domain_status_conversions!(StorageBackend {
    Memory => "memory",
    Session => "session",
    Persistent => "persistent",
});

/// Settings of one domain cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainCacheConfig {
    pub max_size: usize,
    pub ttl_secs: u64,
    pub backend: StorageBackend,
}

impl DomainCacheConfig {
    pub const fn new(max_size: usize, ttl_secs: u64, backend: StorageBackend) -> Self {
        Self { max_size, ttl_secs, backend }
    }

    fn validate(&self, domain: &str) -> Result<()> {
        if self.max_size == 0 {
            return Err(AniStreamError::Config(format!("cache.{domain}.max_size must be positive")));
        }
        if self.ttl_secs == 0 {
            return Err(AniStreamError::Config(format!("cache.{domain}.ttl_secs must be positive")));
        }
        Ok(())
    }
}

/// Settings for all domain caches
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PartialCacheSettings")]
pub struct CacheSettings {
    /// SQLite file backing the persistent medium
    pub db_path: String,
    /// Period of the background expiry sweep
    pub cleanup_interval_secs: u64,
    pub anime: DomainCacheConfig,
    pub episodes: DomainCacheConfig,
    pub search: DomainCacheConfig,
    pub images: DomainCacheConfig,
}

impl Default for CacheSettings {
    fn default() -> Self {
        Self {
            db_path: DEFAULT_CACHE_DB_PATH.to_string(),
            cleanup_interval_secs: CACHE_CLEANUP_INTERVAL_SECS,
            anime: DomainCacheConfig::new(
                ANIME_CACHE_MAX_SIZE,
                ANIME_CACHE_TTL_SECS,
                StorageBackend::Persistent,
            ),
            episodes: DomainCacheConfig::new(
                EPISODES_CACHE_MAX_SIZE,
                EPISODES_CACHE_TTL_SECS,
                StorageBackend::Persistent,
            ),
            search: DomainCacheConfig::new(
                SEARCH_CACHE_MAX_SIZE,
                SEARCH_CACHE_TTL_SECS,
                StorageBackend::Session,
            ),
            images: DomainCacheConfig::new(
                IMAGES_CACHE_MAX_SIZE,
                IMAGES_CACHE_TTL_SECS,
                StorageBackend::Persistent,
            ),
        }
    }
}

/// [`CacheSettings`] as read from a file, any field may be missing
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialCacheSettings {
    db_path: Option<String>,
    cleanup_interval_secs: Option<u64>,
    anime: PartialDomainConfig,
    episodes: PartialDomainConfig,
    search: PartialDomainConfig,
    images: PartialDomainConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct PartialDomainConfig {
    max_size: Option<usize>,
    ttl_secs: Option<u64>,
    backend: Option<StorageBackend>,
}

impl PartialDomainConfig {
    fn or(self, defaults: DomainCacheConfig) -> DomainCacheConfig {
        DomainCacheConfig {
            max_size: self.max_size.unwrap_or(defaults.max_size),
            ttl_secs: self.ttl_secs.unwrap_or(defaults.ttl_secs),
            backend: self.backend.unwrap_or(defaults.backend),
        }
    }
}

impl From<PartialCacheSettings> for CacheSettings {
    fn from(partial: PartialCacheSettings) -> Self {
        let defaults = Self::default();
        Self {
            db_path: partial.db_path.unwrap_or(defaults.db_path),
            cleanup_interval_secs: partial
                .cleanup_interval_secs
                .unwrap_or(defaults.cleanup_interval_secs),
            anime: partial.anime.or(defaults.anime),
            episodes: partial.episodes.or(defaults.episodes),
            search: partial.search.or(defaults.search),
            images: partial.images.or(defaults.images),
        }
    }
}

impl CacheSettings {
    /// Reject zero sizes, TTLs and sweep intervals
    ///
    /// # Errors
    /// Returns `AniStreamError::Config` naming the first invalid field.
    pub fn validate(&self) -> Result<()> {
        if self.cleanup_interval_secs == 0 {
            return Err(AniStreamError::Config(
                "cache.cleanup_interval_secs must be positive".to_string(),
            ));
        }
        self.anime.validate("anime")?;
        self.episodes.validate("episodes")?;
        self.search.validate("search")?;
        self.images.validate("images")
    }

    /// Whether any domain needs the persistent medium
    pub fn needs_persistent_medium(&self) -> bool {
        [self.anime, self.episodes, self.search, self.images]
            .iter()
            .any(|domain| domain.backend == StorageBackend::Persistent)
    }
}

/// Tracing subscriber settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive, overridden by `RUST_LOG`
    pub level: String,
    /// Emit JSON lines instead of the compact format
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "info".to_string(), json: false }
    }
}
