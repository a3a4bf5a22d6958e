//! Testing utilities and helpers
//!
//! - **[`mocks`]**: storage media that fail on demand, for exercising the
//!   cache's absorb-and-log paths, and one that stalls a write so ordering
//!   against concurrent operations can be checked
//!
//! Time control lives in [`crate::time::MockClock`] and is re-exported here.
//!
//! ```rust
//! use std::sync::Arc;
//!
//! use anistream_common::cache::{Cache, CacheConfig, MediumStorage};
//! use anistream_common::testing::FailingMedium;
//!
//! let medium = FailingMedium::new();
//! medium.fail_writes(true);
//!
//! let cache: Cache<u32> =
//!     Cache::with_storage(CacheConfig::default(), Arc::new(MediumStorage::persistent(medium, "t:")));
//! cache.set("k", 1);
//! cache.flush();
//! assert_eq!(cache.get("k"), Some(1));
//! ```

pub mod mocks;

pub use mocks::{FailingMedium, GatedMedium};

pub use crate::time::MockClock;
