//! # AniStream Infrastructure
//!
//! Infrastructure implementations behind the cache layer.
//!
//! This crate contains:
//! - The SQLite-backed persistent medium
//! - Storage media bootstrap with fallback to session storage
//! - Configuration loading (files and environment)
//! - Tracing subscriber setup
//!
//! ## Architecture
//! - Implements traits defined in `anistream-common` and `anistream-core`
//! - Contains all "impure" code (file system, SQLite, process environment)

pub mod bootstrap;
pub mod config;
pub mod errors;
pub mod observability;
pub mod storage;

// Re-export commonly used items
pub use bootstrap::{build_caches, start_cache_runtime, CacheRuntime};
pub use errors::InfraError;
pub use observability::init_tracing;
pub use storage::{open_storage_media, SqliteMedium};
