//! Periodic expiry sweep

use std::sync::Arc;

use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, trace};

use super::core::{Cache, CacheValue};
use crate::time::Clock;

/// Handle to a running sweep task
///
/// Dropping the handle leaves the sweep running; it ends on its own once the
/// last handle to the cache is dropped.
#[derive(Debug)]
pub struct CleanupHandle {
    task: JoinHandle<()>,
}

impl CleanupHandle {
    /// Stop the sweep
    pub fn stop(&self) {
        self.task.abort();
    }

    /// Whether the sweep task has ended
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl<V, C> Cache<V, C>
where
    V: CacheValue,
    C: Clock,
{
    /// Start sweeping expired entries every `cleanup_interval`
    ///
    /// Must be called from within a tokio runtime. The task holds only a weak
    /// reference to the cache.
    pub fn spawn_cleanup(&self) -> CleanupHandle {
        let period = self.config().cleanup_interval;
        let prefix = self.config().key_prefix.clone();
        let weak = Arc::downgrade(&self.inner);

        let task = tokio::spawn(async move {
            let mut ticker = interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            // The first tick completes immediately.
            ticker.tick().await;

            loop {
                ticker.tick().await;
                let Some(inner) = weak.upgrade() else {
                    debug!(prefix = %prefix, "cache dropped, stopping cleanup");
                    break;
                };
                let removed = Cache { inner }.cleanup();
                trace!(prefix = %prefix, removed, "cleanup tick");
            }
        });

        CleanupHandle { task }
    }
}
