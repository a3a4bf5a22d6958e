//! Integration tests for cache module
//!
//! Exercises expiry, LRU eviction, tag invalidation, cache-aside reads, the
//! periodic sweep and concurrent access through the public API.

#![cfg(feature = "runtime")]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anistream_common::cache::{Cache, CacheConfig, EntryOptions, NoopStorage};
use anistream_common::time::MockClock;
use futures::future::join_all;

fn cache_with_clock(max_size: usize) -> (Cache<String, MockClock>, MockClock) {
    let clock = MockClock::at_epoch_millis(1_700_000_000_000);
    let cache = Cache::with_clock(
        CacheConfig::new(max_size, Duration::from_secs(300)),
        Arc::new(NoopStorage),
        clock.clone(),
    );
    (cache, clock)
}

/// Verifies that an entry written with a short TTL is served until the TTL
/// elapses and is gone afterwards.
///
/// # Test Steps
/// 1. Write `k` with a 100 ms TTL
/// 2. Read it back immediately
/// 3. Advance the clock by 150 ms
/// 4. Verify `get` returns `None` and `has` returns false
#[test]
fn test_ttl_expiry() {
    let (cache, clock) = cache_with_clock(10);

    cache.set_with("k", "v".to_string(), EntryOptions::new().ttl(Duration::from_millis(100)));
    assert_eq!(cache.get("k").as_deref(), Some("v"));

    clock.advance_millis(150);

    assert_eq!(cache.get("k"), None);
    assert!(!cache.has("k"));
}

/// Verifies that a read protects an entry from eviction.
///
/// # Test Steps
/// 1. Fill a two-entry cache with `a` then `b`
/// 2. Read `a`, making `b` the least recently used
/// 3. Write `c`
/// 4. Verify `b` was evicted while `a` and `c` remain
#[test]
fn test_lru_eviction_respects_reads() {
    let (cache, _) = cache_with_clock(2);

    cache.set("a", "1".to_string());
    cache.set("b", "2".to_string());
    let _ = cache.get("a");
    cache.set("c", "3".to_string());

    assert!(!cache.has("b"));
    assert!(cache.has("a"));
    assert!(cache.has("c"));
    assert_eq!(cache.len(), 2);
    assert_eq!(cache.stats().evictions, 1);
}

/// Verifies that the cache never grows past its capacity under a long
/// stream of distinct writes.
#[test]
fn test_size_never_exceeds_capacity() {
    let (cache, _) = cache_with_clock(5);

    for i in 0..100 {
        cache.set(format!("key-{i}"), i.to_string());
        assert!(cache.len() <= 5);
    }

    let expected: Vec<String> = (95..100).map(|i| format!("key-{i}")).collect();
    assert_eq!(cache.keys(), expected);
}

/// Verifies that tag invalidation removes exactly the tagged entries.
///
/// # Test Steps
/// 1. Tag `x` and `y` with `genre:action`, `z` with `genre:drama`
/// 2. Invalidate `genre:action`
/// 3. Verify two entries were removed and `z` survives
#[test]
fn test_tag_invalidation() {
    let (cache, _) = cache_with_clock(10);

    cache.set_with("x", "1".to_string(), EntryOptions::new().tag("genre:action"));
    cache.set_with("y", "2".to_string(), EntryOptions::new().tag("genre:action"));
    cache.set_with("z", "3".to_string(), EntryOptions::new().tag("genre:drama"));

    assert_eq!(cache.invalidate_by_tag("genre:action"), 2);

    assert!(!cache.has("x"));
    assert!(!cache.has("y"));
    assert!(cache.has("z"));
    assert_eq!(cache.invalidate_by_tag("genre:action"), 0);
}

/// Verifies that deleting an entry also drops it from the tag index.
#[test]
fn test_delete_clears_tag_membership() {
    let (cache, _) = cache_with_clock(10);
    cache.set_with("x", "1".to_string(), EntryOptions::new().tag("t"));

    assert!(cache.delete("x"));
    cache.set("x", "2".to_string());

    assert_eq!(cache.invalidate_by_tag("t"), 0);
    assert!(cache.has("x"));
}

/// Verifies `delete` reports whether something was removed.
#[test]
fn test_delete_idempotence() {
    let (cache, _) = cache_with_clock(10);

    assert!(!cache.delete("missing"));

    cache.set("k", "v".to_string());
    assert!(cache.delete("k"));
    assert!(!cache.delete("k"));
}

/// Verifies that a manual sweep removes every expired entry and nothing else.
///
/// # Test Steps
/// 1. Write 10 entries with a 50 ms TTL and one with the default TTL
/// 2. Advance the clock past 50 ms
/// 3. Verify `cleanup` reports 10 and only the long-lived entry remains
#[test]
fn test_cleanup_removes_expired() {
    let (cache, clock) = cache_with_clock(100);
    let short = EntryOptions::new().ttl(Duration::from_millis(50));

    for i in 0..10 {
        cache.set_with(format!("short-{i}"), i.to_string(), short.clone());
    }
    cache.set("long", "kept".to_string());

    clock.advance_millis(60);

    assert_eq!(cache.cleanup(), 10);
    assert_eq!(cache.entries(), vec![("long".to_string(), "kept".to_string())]);
    assert_eq!(cache.cleanup(), 0);
}

/// Verifies that a sweep over only-expired entries leaves the cache empty.
#[test]
fn test_cleanup_all_expired_leaves_nothing() {
    let (cache, clock) = cache_with_clock(100);
    for i in 0..7 {
        cache.set_with(
            format!("k{i}"),
            "v".to_string(),
            EntryOptions::new().ttl(Duration::from_millis(10)),
        );
    }

    clock.advance_millis(10);

    assert_eq!(cache.cleanup(), 7);
    assert!(cache.entries().is_empty());
    assert!(cache.is_empty());
}

/// Verifies `clear` drops entries and tags.
#[test]
fn test_clear_resets_everything() {
    let (cache, _) = cache_with_clock(10);
    cache.set_with("a", "1".to_string(), EntryOptions::new().tag("t"));
    cache.set("b", "2".to_string());

    cache.clear();

    assert!(cache.is_empty());
    assert!(cache.keys().is_empty());
    assert_eq!(cache.invalidate_by_tag("t"), 0);
}

/// Verifies that a cache-aside read never calls the factory on a hit.
#[tokio::test]
async fn test_get_or_set_skips_factory_on_hit() {
    let (cache, _) = cache_with_clock(10);
    cache.set("k", "cached".to_string());
    let calls = AtomicUsize::new(0);

    let value = cache
        .get_or_set(
            "k",
            || async {
                calls.fetch_add(1, Ordering::SeqCst);
                Ok::<_, std::io::Error>("fresh".to_string())
            },
            EntryOptions::default(),
        )
        .await
        .unwrap();

    assert_eq!(value, "cached");
    assert_eq!(calls.load(Ordering::SeqCst), 0);
}

/// Verifies that a miss stores the factory value with the requested options.
#[tokio::test]
async fn test_get_or_set_stores_on_miss() {
    let (cache, clock) = cache_with_clock(10);

    let value = cache
        .get_or_set(
            "k",
            || async { Ok::<_, std::io::Error>("fresh".to_string()) },
            EntryOptions::new().ttl(Duration::from_secs(1)).tag("t"),
        )
        .await
        .unwrap();

    assert_eq!(value, "fresh");
    assert_eq!(cache.get("k").as_deref(), Some("fresh"));

    clock.advance(Duration::from_secs(1));
    assert!(!cache.has("k"));
}

/// Verifies that a factory failure propagates and nothing is cached.
#[tokio::test]
async fn test_get_or_set_propagates_factory_error() {
    let (cache, _) = cache_with_clock(10);

    let result = cache
        .get_or_set("k", || async { Err::<String, _>("upstream down") }, EntryOptions::default())
        .await;

    assert_eq!(result, Err("upstream down"));
    assert!(!cache.has("k"));
}

/// Documents that concurrent misses on one key each run their factory with
/// `get_or_set`, while eight concurrent `get_or_set_coalesced` calls run only
/// one.
#[tokio::test(start_paused = true)]
async fn test_concurrent_misses_and_coalescing() {
    let (cache, _) = cache_with_clock(10);
    let calls = Arc::new(AtomicUsize::new(0));

    let load = |calls: Arc<AtomicUsize>| {
        move || async move {
            calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(Duration::from_millis(10)).await;
            Ok::<_, String>("value".to_string())
        }
    };

    let (a, b) = tokio::join!(
        cache.get_or_set("plain", load(Arc::clone(&calls)), EntryOptions::default()),
        cache.get_or_set("plain", load(Arc::clone(&calls)), EntryOptions::default()),
    );
    assert_eq!(a.unwrap(), "value");
    assert_eq!(b.unwrap(), "value");
    assert_eq!(calls.swap(0, Ordering::SeqCst), 2);

    let loads = (0..8).map(|_| {
        cache.get_or_set_coalesced("shared", load(Arc::clone(&calls)), EntryOptions::default())
    });
    let results = join_all(loads).await;
    assert_eq!(results.len(), 8);
    assert!(results.iter().all(|result| matches!(result, Ok(value) if value == "value")));
    assert_eq!(calls.load(Ordering::SeqCst), 1);
}

/// Verifies that a failed coalesced load lets the next waiter try its own
/// factory.
#[tokio::test(start_paused = true)]
async fn test_coalesced_failure_hands_over() {
    let (cache, _) = cache_with_clock(10);

    let failing = || async {
        tokio::time::sleep(Duration::from_millis(10)).await;
        Err::<String, _>("boom".to_string())
    };
    let succeeding = || async { Ok::<_, String>("second".to_string()) };

    let (a, b) = tokio::join!(
        cache.get_or_set_coalesced("k", failing, EntryOptions::default()),
        cache.get_or_set_coalesced("k", succeeding, EntryOptions::default()),
    );

    assert_eq!(a, Err("boom".to_string()));
    assert_eq!(b, Ok("second".to_string()));
    assert_eq!(cache.get("k").as_deref(), Some("second"));
}

/// Verifies that the background sweep removes expired entries on its own.
///
/// # Test Steps
/// 1. Spawn the sweep with a 60 s period
/// 2. Expire an entry on the mock clock
/// 3. Let paused tokio time run past one period
/// 4. Verify the entry was swept without any read
#[tokio::test(start_paused = true)]
async fn test_periodic_cleanup_sweeps() {
    let (cache, clock) = cache_with_clock(10);
    let handle = cache.spawn_cleanup();

    cache.set_with("k", "v".to_string(), EntryOptions::new().ttl(Duration::from_secs(1)));
    clock.advance(Duration::from_secs(2));
    assert_eq!(cache.len(), 1);

    tokio::time::sleep(Duration::from_secs(61)).await;

    assert_eq!(cache.len(), 0);
    assert_eq!(cache.stats().expirations, 1);
    handle.stop();
}

/// Verifies that the sweep task ends once the cache is dropped.
#[tokio::test(start_paused = true)]
async fn test_periodic_cleanup_stops_with_cache() {
    let (cache, _) = cache_with_clock(10);
    let handle = cache.spawn_cleanup();

    drop(cache);
    tokio::time::sleep(Duration::from_secs(61)).await;
    tokio::task::yield_now().await;

    assert!(handle.is_finished());
}

/// Tests concurrent access from multiple threads.
///
/// # Test Steps
/// 1. Spawn 10 threads each writing and reading its own keys
/// 2. Verify the cache stays within capacity and counters add up
#[test]
fn test_concurrent_threads() {
    let (cache, _) = cache_with_clock(50);
    let mut handles = vec![];

    for t in 0..10 {
        let cache = cache.clone();
        handles.push(thread::spawn(move || {
            for i in 0..20 {
                let key = format!("t{t}-{i}");
                cache.set(key.clone(), i.to_string());
                let _ = cache.get(&key);
            }
        }));
    }

    for handle in handles {
        handle.join().unwrap();
    }

    let stats = cache.stats();
    assert!(stats.size <= 50);
    assert_eq!(stats.inserts, 200);
    assert_eq!(stats.hits + stats.misses, 200);
}
