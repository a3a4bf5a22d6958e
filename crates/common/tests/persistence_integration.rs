//! Integration tests for cache persistence
//!
//! Covers restore-on-construction, write-through of every removal path,
//! ordering of background writes against concurrent operations, and the
//! absorb-and-log behaviour when the storage medium misbehaves.

#![cfg(feature = "runtime")]

use std::sync::Arc;
use std::time::Duration;

use anistream_common::cache::{
    Cache, CacheConfig, EntryOptions, KeyValueMedium, MediumStorage, MemoryMedium, StorageKind,
};
use anistream_common::testing::{FailingMedium, GatedMedium};
use anistream_common::time::MockClock;

const PREFIX: &str = "anistream:test:";

fn config(max_size: usize) -> CacheConfig {
    CacheConfig::builder()
        .max_size(max_size)
        .default_ttl(Duration::from_secs(600))
        .storage(StorageKind::Persistent)
        .key_prefix(PREFIX)
        .build()
}

fn persistent_cache<M>(medium: M, max_size: usize, clock: &MockClock) -> Cache<u32, MockClock>
where
    M: KeyValueMedium + 'static,
{
    Cache::with_clock(
        config(max_size),
        Arc::new(MediumStorage::persistent(medium, PREFIX)),
        clock.clone(),
    )
}

/// Verifies that a rebuilt cache restores an entry within its TTL and drops
/// it afterwards.
///
/// # Test Steps
/// 1. Write `p = 42` with a 10 s TTL
/// 2. Rebuild the cache on the same medium and prefix
/// 3. Verify `p` is served
/// 4. Advance past the TTL, rebuild again, verify `p` is gone from cache and
///    medium
#[test]
fn test_round_trip_within_and_after_ttl() {
    let medium = MemoryMedium::new();
    let clock = MockClock::at_epoch_millis(1_700_000_000_000);

    let cache = persistent_cache(medium.clone(), 10, &clock);
    cache.set_with("p", 42, EntryOptions::new().ttl(Duration::from_secs(10)));
    drop(cache);

    clock.advance(Duration::from_secs(5));
    let rebuilt = persistent_cache(medium.clone(), 10, &clock);
    assert_eq!(rebuilt.get("p"), Some(42));
    drop(rebuilt);

    clock.advance(Duration::from_secs(6));
    let expired = persistent_cache(medium.clone(), 10, &clock);
    assert_eq!(expired.get("p"), None);
    expired.flush();
    assert!(medium.get(&format!("{PREFIX}p")).unwrap().is_none());
}

/// Verifies that a session-scoped cache restores from the shared medium.
#[test]
fn test_session_medium_survives_rebuild() {
    let medium = MemoryMedium::new();
    let build = || -> Cache<u32> {
        Cache::with_storage(
            CacheConfig::builder().key_prefix(PREFIX).build(),
            Arc::new(MediumStorage::session(medium.clone(), PREFIX)),
        )
    };

    let cache = build();
    cache.set("q", 7);
    assert_eq!(cache.storage_kind(), StorageKind::Session);
    drop(cache);

    assert_eq!(build().get("q"), Some(7));
}

/// Verifies that tags survive a rebuild and still drive invalidation.
#[test]
fn test_tags_restored() {
    let medium = MemoryMedium::new();
    let clock = MockClock::at_epoch_millis(0);

    let cache = persistent_cache(medium.clone(), 10, &clock);
    cache.set_with("x", 1, EntryOptions::new().tag("genre:action"));
    cache.set_with("z", 2, EntryOptions::new().tag("genre:drama"));
    drop(cache);

    let rebuilt = persistent_cache(medium.clone(), 10, &clock);
    assert_eq!(rebuilt.invalidate_by_tag("genre:action"), 1);
    assert!(rebuilt.has("z"));
    rebuilt.flush();
    assert!(medium.get(&format!("{PREFIX}x")).unwrap().is_none());
}

/// Verifies that loading more valid entries than fit keeps the most recently
/// written ones and removes the rest from the medium.
#[test]
fn test_restore_over_capacity_evicts_oldest() {
    let medium = MemoryMedium::new();
    let clock = MockClock::at_epoch_millis(1_000);

    let wide = persistent_cache(medium.clone(), 10, &clock);
    for (i, key) in ["a", "b", "c", "d"].into_iter().enumerate() {
        wide.set(key, u32::try_from(i).unwrap());
        clock.advance_millis(10);
    }
    drop(wide);

    let narrow = persistent_cache(medium.clone(), 2, &clock);
    narrow.flush();

    assert_eq!(narrow.keys(), vec!["c".to_string(), "d".to_string()]);
    assert!(medium.get(&format!("{PREFIX}a")).unwrap().is_none());
    assert!(medium.get(&format!("{PREFIX}b")).unwrap().is_none());
}

/// Verifies that eviction and deletion remove persisted copies.
#[test]
fn test_removal_paths_write_through() {
    let medium = MemoryMedium::new();
    let clock = MockClock::at_epoch_millis(0);
    let cache = persistent_cache(medium.clone(), 1, &clock);

    cache.set("a", 1);
    cache.set("b", 2);
    cache.flush();
    assert!(medium.get(&format!("{PREFIX}a")).unwrap().is_none());
    assert!(medium.get(&format!("{PREFIX}b")).unwrap().is_some());

    assert!(cache.delete("b"));
    cache.flush();
    assert!(medium.get(&format!("{PREFIX}b")).unwrap().is_none());
}

/// Verifies that `clear` purges only this cache's prefix.
#[test]
fn test_clear_is_prefix_scoped() {
    let medium = MemoryMedium::new();
    medium.set("anistream:other:k", "untouched").unwrap();
    let clock = MockClock::at_epoch_millis(0);
    let cache = persistent_cache(medium.clone(), 10, &clock);
    cache.set("a", 1);
    cache.set("b", 2);

    cache.clear();
    cache.flush();

    assert!(cache.is_empty());
    assert_eq!(medium.keys_with_prefix(PREFIX).unwrap().len(), 0);
    assert_eq!(medium.get("anistream:other:k").unwrap().as_deref(), Some("untouched"));
}

/// Verifies that malformed records are skipped and discarded on load.
#[test]
fn test_malformed_records_discarded() {
    let medium = MemoryMedium::new();
    medium.set(&format!("{PREFIX}broken"), "{\"data\":").unwrap();
    medium.set(&format!("{PREFIX}wrong-type"), "{\"data\":\"text\"}").unwrap();
    let clock = MockClock::at_epoch_millis(0);

    let cache = persistent_cache(medium.clone(), 10, &clock);

    assert!(cache.is_empty());
    assert!(medium.is_empty());
}

/// Verifies that write failures are absorbed and the in-memory cache keeps
/// working.
///
/// # Test Steps
/// 1. Build a persistent cache over a medium that rejects writes
/// 2. Write, read, delete and clear
/// 3. Verify every in-memory result is correct and writes were attempted
#[test]
fn test_write_failures_are_absorbed() {
    let medium = FailingMedium::new();
    medium.fail_writes(true);
    let clock = MockClock::at_epoch_millis(0);
    let cache = persistent_cache(medium.clone(), 10, &clock);

    cache.set("a", 1);
    cache.set("b", 2);
    assert_eq!(cache.get("a"), Some(1));
    assert!(cache.delete("b"));
    cache.clear();
    cache.flush();

    assert!(cache.is_empty());
    assert!(medium.rejected() >= 3);
    assert!(medium.inner().is_empty());
}

/// Verifies that a failed load leaves an empty but usable cache.
#[test]
fn test_load_failure_starts_empty() {
    let medium = FailingMedium::new();
    medium.inner().set(&format!("{PREFIX}a"), "ignored").unwrap();
    medium.fail_reads(true);
    let clock = MockClock::at_epoch_millis(0);

    let cache = persistent_cache(medium.clone(), 10, &clock);
    assert!(cache.is_empty());

    cache.set("b", 2);
    assert_eq!(cache.get("b"), Some(2));
    cache.flush();
    assert!(medium.inner().get(&format!("{PREFIX}b")).unwrap().is_some());
}

/// Verifies that a delete racing a stalled write is not undone in storage.
///
/// # Test Steps
/// 1. Park the medium's next write and `set("k", 1)`
/// 2. While the save is parked, `delete("k")`
/// 3. Release the medium and flush
/// 4. Verify neither the medium nor a rebuilt cache holds `k`
#[test]
fn test_delete_during_stalled_save_stays_deleted() {
    let medium = GatedMedium::new();
    let clock = MockClock::at_epoch_millis(0);
    let cache = persistent_cache(medium.clone(), 10, &clock);

    medium.hold_next_write();
    cache.set("k", 1);
    assert!(medium.wait_until_parked(Duration::from_secs(5)));
    assert!(cache.delete("k"));

    medium.release();
    cache.flush();
    assert!(medium.inner().get(&format!("{PREFIX}k")).unwrap().is_none());
    drop(cache);

    let rebuilt = persistent_cache(medium, 10, &clock);
    assert_eq!(rebuilt.get("k"), None);
}

/// Verifies that cache operations return while the medium is stalled and
/// that the queued writes land in order once it recovers.
///
/// # Test Steps
/// 1. Park the first write of `set("a")`
/// 2. Overwrite `a`, tag-invalidate `b`, then clear and write `c`, all while
///    the medium is parked
/// 3. Release, flush, and check the medium holds only `c`
#[test]
fn test_operations_do_not_wait_for_stalled_medium() {
    let medium = GatedMedium::new();
    let clock = MockClock::at_epoch_millis(0);
    let cache = persistent_cache(medium.clone(), 10, &clock);

    medium.hold_next_write();
    cache.set("a", 1);
    assert!(medium.wait_until_parked(Duration::from_secs(5)));

    cache.set("a", 2);
    cache.set_with("b", 3, EntryOptions::new().tag("genre:drama"));
    assert_eq!(cache.invalidate_by_tag("genre:drama"), 1);
    cache.clear();
    cache.set("c", 4);
    assert_eq!(cache.keys(), vec!["c".to_string()]);
    assert!(medium.inner().is_empty());

    medium.release();
    cache.flush();
    assert_eq!(medium.inner().keys_with_prefix(PREFIX).unwrap(), vec![format!("{PREFIX}c")]);
}
