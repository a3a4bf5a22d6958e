//! # AniStream Core
//!
//! Cache wiring and cache-aside use cases - no infrastructure dependencies.
//!
//! This crate contains:
//! - The domain cache registry (one typed cache per data domain)
//! - Port interfaces for metadata sources (traits)
//! - The catalog service route handlers read through
//!
//! ## Architecture Principles
//! - Only depends on `anistream-common` and `anistream-domain`
//! - No database, HTTP, or platform code
//! - Storage media and metadata sources are injected

#![warn(missing_docs)]

pub mod catalog;
pub mod ports;
pub mod registry;

pub use catalog::CatalogService;
pub use ports::MetadataSource;
pub use registry::{CacheDomain, DomainCaches, MaintenanceHandle, StorageMedia};
