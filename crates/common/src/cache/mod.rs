//! Typed client-side cache with TTL, LRU eviction, tags and persistence
//!
//! One [`Cache`] instance serves one data domain. It keeps entries in memory,
//! evicts the least recently used entry when full, expires entries lazily on
//! access and through a periodic sweep, and invalidates groups of entries by
//! tag. Persistence is pluggable through [`StorageAdapter`]. Storage changes
//! are queued in memory order and applied by a background writer, so no
//! operation waits on the medium; [`Cache::flush`] waits for the queue to
//! drain. Storage failures are logged and never reach callers.
//!
//! # Examples
//!
//! ## Memory-only cache
//! ```
//! use std::time::Duration;
//!
//! use anistream_common::cache::{Cache, CacheConfig};
//!
//! let cache: Cache<u32> = Cache::new(CacheConfig::new(2, Duration::from_secs(60)));
//! cache.set("a", 1);
//! cache.set("b", 2);
//! let _ = cache.get("a");
//! cache.set("c", 3);
//!
//! assert!(!cache.has("b"));
//! assert_eq!(cache.keys(), vec!["a".to_string(), "c".to_string()]);
//! ```
//!
//! ## Session-scoped persistence
//! ```
//! use std::sync::Arc;
//!
//! use anistream_common::cache::{Cache, CacheConfig, MediumStorage, MemoryMedium};
//!
//! let medium = MemoryMedium::new();
//! let build = |medium: MemoryMedium| -> Cache<String> {
//!     Cache::with_storage(
//!         CacheConfig::default(),
//!         Arc::new(MediumStorage::session(medium, "anistream:search:")),
//!     )
//! };
//!
//! let first = build(medium.clone());
//! first.set("1:naruto", "results".to_string());
//! assert_eq!(first.config().key_prefix, "anistream:search:");
//! drop(first);
//!
//! let rebuilt = build(medium);
//! assert_eq!(rebuilt.get("1:naruto").as_deref(), Some("results"));
//! ```
//!
//! ## Cache-aside
//! ```
//! use anistream_common::cache::{Cache, CacheConfig, EntryOptions};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() {
//! let cache: Cache<Vec<u32>> = Cache::new(CacheConfig::default());
//! let episodes = cache
//!     .get_or_set(
//!         "episodes:21",
//!         || async { Ok::<_, std::io::Error>(vec![1, 2, 3]) },
//!         EntryOptions::new().tag("anime:21"),
//!     )
//!     .await
//!     .unwrap();
//! assert_eq!(episodes.len(), 3);
//! # }
//! ```

mod config;
mod core;
mod entry;
mod error;
mod flight;
mod maintenance;
mod stats;
mod storage;
mod tags;
mod writer;

// Re-export public API
pub use self::core::{Cache, CacheValue};

pub use config::{
    CacheConfig, CacheConfigBuilder, EntryOptions, StorageKind, DEFAULT_CLEANUP_INTERVAL,
};
pub use entry::CacheEntry;
pub use error::{CacheError, CacheResult};
pub use maintenance::CleanupHandle;
pub use stats::CacheStats;
pub use storage::{KeyValueMedium, MediumStorage, MemoryMedium, NoopStorage, StorageAdapter};
pub use tags::TagIndex;
