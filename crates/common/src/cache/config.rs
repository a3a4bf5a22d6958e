//! Cache configuration types and builder patterns
//!
//! A cache is configured with a capacity, a default TTL, the persistence
//! strategy it expects, the prefix its persisted keys live under and the
//! period of its background sweep.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::error::{CacheError, CacheResult};
use crate::error::CommonError;

/// Period of the background expiry sweep unless configured otherwise
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Persistence strategy backing a cache
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    /// In-memory only, nothing is persisted
    #[default]
    Memory,
    /// Ephemeral-scoped: survives cache rebuilds for the lifetime of the
    /// session
    Session,
    /// Origin-scoped: survives process restarts until cleared
    Persistent,
}

impl StorageKind {
    /// Whether entries are written through to a storage medium
    pub fn is_persisted(self) -> bool {
        !matches!(self, Self::Memory)
    }
}

impl fmt::Display for StorageKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Session => write!(f, "session"),
            Self::Persistent => write!(f, "persistent"),
        }
    }
}

/// Configuration for cache behavior
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// Maximum number of entries, must be greater than zero
    pub max_size: usize,

    /// TTL applied when a write does not specify one
    pub default_ttl: Duration,

    /// Persistence strategy the cache is meant to run with
    pub storage: StorageKind,

    /// Prefix under which persisted keys are stored
    ///
    /// A persisting adapter that carries its own prefix overrides this value
    /// when the cache is built, so the two never disagree.
    pub key_prefix: String,

    /// Period of the background expiry sweep
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_size: 100,
            default_ttl: Duration::from_secs(300),
            storage: StorageKind::Memory,
            key_prefix: "anistream:cache:".to_string(),
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl CacheConfig {
    /// Create a new configuration builder
    pub fn builder() -> CacheConfigBuilder {
        CacheConfigBuilder::default()
    }

    /// Quick preset for an in-memory cache
    ///
    /// # Example
    /// ```
    /// use std::time::Duration;
    ///
    /// use anistream_common::cache::CacheConfig;
    ///
    /// let config = CacheConfig::new(500, Duration::from_secs(600));
    /// assert_eq!(config.max_size, 500);
    /// ```
    pub fn new(max_size: usize, default_ttl: Duration) -> Self {
        Self { max_size, default_ttl, ..Self::default() }
    }

    /// Check the invariants a cache relies on
    pub fn validate(&self) -> CacheResult<()> {
        if self.max_size == 0 {
            return Err(CacheError::Common(CommonError::validation_with_value(
                "max_size",
                "must be greater than zero",
                "0",
            )));
        }
        if self.default_ttl.is_zero() {
            return Err(CacheError::Common(CommonError::validation(
                "default_ttl",
                "must be greater than zero",
            )));
        }
        if self.cleanup_interval.is_zero() {
            return Err(CacheError::Common(CommonError::validation(
                "cleanup_interval",
                "must be greater than zero",
            )));
        }
        if self.storage.is_persisted() && self.key_prefix.is_empty() {
            return Err(CacheError::Common(CommonError::config_field(
                "key_prefix",
                "persisted caches need a non-empty prefix",
            )));
        }
        Ok(())
    }

    /// Copy of this configuration with zero capacity and zero sweep period
    /// raised to their minimums
    pub(crate) fn normalized(&self) -> Self {
        Self {
            max_size: self.max_size.max(1),
            cleanup_interval: self.cleanup_interval.max(Duration::from_millis(1)),
            ..self.clone()
        }
    }
}

/// Builder for CacheConfig with fluent API
#[derive(Debug, Default)]
pub struct CacheConfigBuilder {
    config: CacheConfig,
}

impl CacheConfigBuilder {
    /// Create a new builder with default settings
    pub fn new() -> Self {
        Self::default()
    }

    /// Set maximum number of entries
    pub fn max_size(mut self, size: usize) -> Self {
        self.config.max_size = size;
        self
    }

    /// Set the default time-to-live
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.config.default_ttl = ttl;
        self
    }

    /// Set the persistence strategy
    pub fn storage(mut self, kind: StorageKind) -> Self {
        self.config.storage = kind;
        self
    }

    /// Set the persisted key prefix
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.key_prefix = prefix.into();
        self
    }

    /// Set the background sweep period
    pub fn cleanup_interval(mut self, interval: Duration) -> Self {
        self.config.cleanup_interval = interval;
        self
    }

    /// Build the configuration
    pub fn build(self) -> CacheConfig {
        self.config
    }
}

/// Per-write options: TTL override and tags
///
/// ```
/// use std::time::Duration;
///
/// use anistream_common::cache::EntryOptions;
///
/// let options = EntryOptions::new().ttl(Duration::from_secs(30)).tag("genre:action");
/// assert!(options.tags.contains("genre:action"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryOptions {
    /// TTL for this entry; the cache default applies when `None`
    pub ttl: Option<Duration>,

    /// Labels attached to the entry
    pub tags: BTreeSet<String>,
}

impl EntryOptions {
    /// Options with no TTL override and no tags
    pub fn new() -> Self {
        Self::default()
    }

    /// Override the TTL
    #[must_use]
    pub fn ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Attach one tag
    #[must_use]
    pub fn tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    /// Attach several tags
    #[must_use]
    pub fn tags<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tags.extend(tags.into_iter().map(Into::into));
        self
    }
}
