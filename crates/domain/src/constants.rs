//! Application constants
//!
//! Centralized location for domain-level constants: per-domain cache
//! capacities and lifetimes, key namespaces and tag prefixes.

// Persisted key namespace, every domain prefix starts with it
pub const KEY_NAMESPACE: &str = "anistream";

// Anime records
pub const ANIME_CACHE_MAX_SIZE: usize = 500;
pub const ANIME_CACHE_TTL_SECS: u64 = 10 * 60;

// Episode lists
pub const EPISODES_CACHE_MAX_SIZE: usize = 1000;
pub const EPISODES_CACHE_TTL_SECS: u64 = 30 * 60;

// Search pages
pub const SEARCH_CACHE_MAX_SIZE: usize = 100;
pub const SEARCH_CACHE_TTL_SECS: u64 = 5 * 60;

// Image assets
pub const IMAGES_CACHE_MAX_SIZE: usize = 2000;
pub const IMAGES_CACHE_TTL_SECS: u64 = 60 * 60;

// Background expiry sweep
pub const CACHE_CLEANUP_INTERVAL_SECS: u64 = 60;

// Default location of the persistent cache database
pub const DEFAULT_CACHE_DB_PATH: &str = "anistream-cache.db";

// Tag prefixes
pub const GENRE_TAG_PREFIX: &str = "genre:";
pub const ANIME_TAG_PREFIX: &str = "anime:";

// Search queries longer than this are truncated before keying
pub const MAX_SEARCH_QUERY_LENGTH: usize = 200;
