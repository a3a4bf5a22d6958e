//! Time abstractions
//!
//! Cache entries are stamped with wall-clock epoch milliseconds so that
//! persisted records stay meaningful across restarts. All reads of "now" go
//! through the [`Clock`] trait, which lets tests move time forward without
//! sleeping.
//!
//! ```rust
//! use std::time::Duration;
//!
//! use anistream_common::time::{Clock, MockClock};
//!
//! let clock = MockClock::at_epoch_millis(1_000);
//! clock.advance(Duration::from_millis(250));
//! assert_eq!(clock.millis_since_epoch(), 1_250);
//! ```

pub mod clock;

pub use clock::{Clock, MockClock, SystemClock};
