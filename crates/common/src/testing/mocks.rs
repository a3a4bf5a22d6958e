//! Mock storage media

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use parking_lot::{Condvar, Mutex};

use crate::cache::{CacheError, CacheResult, KeyValueMedium, MemoryMedium};

#[derive(Debug, Default)]
struct Switches {
    fail_reads: AtomicBool,
    fail_writes: AtomicBool,
    rejected: AtomicUsize,
}

/// In-memory medium whose reads and writes can be made to fail
///
/// Clones share both the records and the failure switches. Failed writes
/// return [`CacheError::Storage`] with a quota message, failed reads return
/// [`CacheError::Unavailable`].
///
/// # Example
///
/// ```
/// use anistream_common::cache::KeyValueMedium;
/// use anistream_common::testing::FailingMedium;
///
/// let medium = FailingMedium::new();
/// medium.set("key1", "value1").unwrap();
///
/// medium.fail_writes(true);
/// assert!(medium.set("key2", "value2").is_err());
/// assert_eq!(medium.rejected(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct FailingMedium {
    records: MemoryMedium,
    switches: Arc<Switches>,
}

impl FailingMedium {
    /// Create a medium that accepts everything
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `set` and `remove` fail
    pub fn fail_writes(&self, fail: bool) {
        self.switches.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Make `keys_with_prefix` and `get` fail
    pub fn fail_reads(&self, fail: bool) {
        self.switches.fail_reads.store(fail, Ordering::SeqCst);
    }

    /// Number of operations rejected so far
    #[must_use]
    pub fn rejected(&self) -> usize {
        self.switches.rejected.load(Ordering::SeqCst)
    }

    /// Records currently stored, bypassing the failure switches
    #[must_use]
    pub fn inner(&self) -> &MemoryMedium {
        &self.records
    }

    fn check(&self, switch: &AtomicBool, error: impl FnOnce() -> CacheError) -> CacheResult<()> {
        if switch.load(Ordering::SeqCst) {
            self.switches.rejected.fetch_add(1, Ordering::SeqCst);
            return Err(error());
        }
        Ok(())
    }

    fn check_read(&self) -> CacheResult<()> {
        self.check(&self.switches.fail_reads, || {
            CacheError::Unavailable("medium offline".to_string())
        })
    }

    fn check_write(&self, operation: &str) -> CacheResult<()> {
        self.check(&self.switches.fail_writes, || CacheError::storage(operation, "quota exceeded"))
    }
}

impl KeyValueMedium for FailingMedium {
    fn keys_with_prefix(&self, prefix: &str) -> CacheResult<Vec<String>> {
        self.check_read()?;
        self.records.keys_with_prefix(prefix)
    }

    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.check_read()?;
        self.records.get(key)
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.check_write("set")?;
        self.records.set(key, value)
    }

    fn remove(&self, key: &str) -> CacheResult<()> {
        self.check_write("remove")?;
        self.records.remove(key)
    }
}

#[derive(Debug, Default)]
struct HoldState {
    armed: bool,
    parked: bool,
}

#[derive(Debug, Default)]
struct Hold {
    state: Mutex<HoldState>,
    changed: Condvar,
}

/// In-memory medium that can park one write until the test lets it go
///
/// Used to stall a cache's persistence mid-write and check what other
/// operations do in the meantime. Clones share the records and the hold.
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use anistream_common::cache::KeyValueMedium;
/// use anistream_common::testing::GatedMedium;
///
/// let medium = GatedMedium::new();
/// medium.hold_next_write();
///
/// let writer = medium.clone();
/// let handle = std::thread::spawn(move || writer.set("k", "v"));
/// assert!(medium.wait_until_parked(Duration::from_secs(5)));
/// assert!(medium.inner().is_empty());
///
/// medium.release();
/// handle.join().unwrap().unwrap();
/// assert_eq!(medium.inner().len(), 1);
/// ```
#[derive(Debug, Clone, Default)]
pub struct GatedMedium {
    records: MemoryMedium,
    hold: Arc<Hold>,
}

impl GatedMedium {
    /// Create a medium that lets every write through
    pub fn new() -> Self {
        Self::default()
    }

    /// Park the next `set` or `remove` until [`release`](Self::release)
    pub fn hold_next_write(&self) {
        self.hold.state.lock().armed = true;
    }

    /// Wait for a held write to arrive, returning whether one did in time
    pub fn wait_until_parked(&self, timeout: Duration) -> bool {
        let mut state = self.hold.state.lock();
        self.hold.changed.wait_while_for(&mut state, |state| !state.parked, timeout);
        state.parked
    }

    /// Let a parked write finish and disarm the hold
    pub fn release(&self) {
        let mut state = self.hold.state.lock();
        state.armed = false;
        state.parked = false;
        self.hold.changed.notify_all();
    }

    /// Records currently stored
    #[must_use]
    pub fn inner(&self) -> &MemoryMedium {
        &self.records
    }

    fn pass(&self) {
        let mut state = self.hold.state.lock();
        if !state.armed {
            return;
        }
        state.armed = false;
        state.parked = true;
        self.hold.changed.notify_all();
        self.hold.changed.wait_while(&mut state, |state| state.parked);
    }
}

impl KeyValueMedium for GatedMedium {
    fn keys_with_prefix(&self, prefix: &str) -> CacheResult<Vec<String>> {
        self.records.keys_with_prefix(prefix)
    }

    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        self.records.get(key)
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.pass();
        self.records.set(key, value)
    }

    fn remove(&self, key: &str) -> CacheResult<()> {
        self.pass();
        self.records.remove(key)
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for testing::mocks.
    use super::*;

    /// Validates `FailingMedium::new` behavior for the passthrough scenario.
    ///
    /// Assertions:
    /// - Confirms `value` equals `Some("value1".to_string())`.
    /// - Confirms `medium.rejected()` equals `0`.
    #[test]
    fn test_failing_medium_passthrough() {
        let medium = FailingMedium::new();
        medium.set("key1", "value1").unwrap();

        let value = medium.get("key1").unwrap();
        assert_eq!(value, Some("value1".to_string()));
        assert_eq!(medium.rejected(), 0);
    }

    /// Validates the write and read failure switches.
    ///
    /// Assertions:
    /// - Ensures writes fail with a storage error while switched on.
    /// - Ensures reads fail with `Unavailable` while switched on.
    /// - Confirms `medium.rejected()` counts both.
    #[test]
    fn test_failing_medium_switches() {
        let medium = FailingMedium::new();
        medium.fail_writes(true);
        assert!(matches!(medium.set("k", "v"), Err(CacheError::Storage { .. })));

        medium.fail_writes(false);
        medium.set("k", "v").unwrap();

        medium.fail_reads(true);
        assert!(matches!(medium.get("k"), Err(CacheError::Unavailable(_))));
        assert_eq!(medium.rejected(), 2);
        assert_eq!(medium.inner().get("k").unwrap(), Some("v".to_string()));
    }

    /// Validates that an unarmed gated medium behaves like a plain one.
    #[test]
    fn test_gated_medium_passthrough() {
        let medium = GatedMedium::new();
        medium.set("k", "v").unwrap();
        medium.remove("k").unwrap();
        medium.release();

        assert!(medium.inner().is_empty());
        assert!(!medium.wait_until_parked(Duration::from_millis(1)));
    }

    /// Validates that clones share the switches.
    #[test]
    fn test_failing_medium_clone_shares_switches() {
        let medium = FailingMedium::new();
        let clone = medium.clone();
        medium.fail_writes(true);
        assert!(clone.remove("k").is_err());
    }
}
