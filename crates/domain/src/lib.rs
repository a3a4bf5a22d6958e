//! # AniStream Domain
//!
//! Business domain types and models for AniStream.
//!
//! This crate contains:
//! - Catalog data types (anime records, episode lists, search pages, images)
//! - Domain error types and Result definitions
//! - Configuration structures for the cache layer
//! - Cache key and tag builders shared by every collaborator
//!
//! ## Architecture
//! - No dependencies on other AniStream crates
//! - Only external dependencies allowed
//! - Pure domain models and data structures

pub mod config;
pub mod constants;
pub mod errors;
pub mod keys;
pub mod macros;
pub mod types;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
pub use types::*;
