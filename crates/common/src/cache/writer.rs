//! Ordered background writer for cache persistence
//!
//! Persisting caches enqueue one [`PersistOp`] per storage change while they
//! still hold their state lock, so the queue order is the order the in-memory
//! mutations happened in. A dedicated thread drains the queue through the
//! storage adapter; callers never wait on the medium. Memory-only caches (and
//! a cache whose writer thread could not start) apply operations inline.

use std::sync::mpsc as std_mpsc;
use std::sync::Arc;
use std::thread::JoinHandle;

use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use super::entry::CacheEntry;
use super::error::CacheError;
use super::storage::StorageAdapter;
use crate::error::{ErrorClassification, ErrorSeverity};

/// One storage change, in queue order
pub(crate) enum PersistOp<V> {
    Save(String, CacheEntry<V>),
    Remove(String),
    Clear,
    /// Acknowledged once every earlier operation has been applied
    Flush(std_mpsc::Sender<()>),
}

pub(crate) struct PersistWriter<V> {
    storage: Arc<dyn StorageAdapter<V>>,
    queue: Option<mpsc::UnboundedSender<PersistOp<V>>>,
    thread: Option<JoinHandle<()>>,
}

impl<V: Send + 'static> PersistWriter<V> {
    /// Writer applying every operation on the calling thread
    pub(crate) fn inline(storage: Arc<dyn StorageAdapter<V>>) -> Self {
        Self { storage, queue: None, thread: None }
    }

    /// Writer draining a queue on its own thread
    pub(crate) fn spawn(storage: Arc<dyn StorageAdapter<V>>, prefix: &str) -> Self {
        let (queue, mut ops) = mpsc::unbounded_channel::<PersistOp<V>>();
        let worker = Arc::clone(&storage);
        let spawned = std::thread::Builder::new()
            .name(format!("cache-writer:{prefix}"))
            .spawn(move || {
                while let Some(op) = ops.blocking_recv() {
                    apply(worker.as_ref(), op);
                }
            });

        match spawned {
            Ok(thread) => {
                debug!(prefix, "cache writer started");
                Self { storage, queue: Some(queue), thread: Some(thread) }
            }
            Err(err) => {
                warn!(prefix, error = %err, "failed to start cache writer, persisting inline");
                Self::inline(storage)
            }
        }
    }

    /// Hand `op` to the writer
    ///
    /// Call with the cache's state lock held so queue order matches memory
    /// order.
    pub(crate) fn submit(&self, op: PersistOp<V>) {
        let Some(queue) = &self.queue else {
            apply(self.storage.as_ref(), op);
            return;
        };
        // The receiver only closes if the writer thread died
        if let Err(mpsc::error::SendError(op)) = queue.send(op) {
            apply(self.storage.as_ref(), op);
        }
    }

    /// Block until every operation submitted so far has been applied
    pub(crate) fn flush(&self) {
        let Some(queue) = &self.queue else {
            return;
        };
        let (done, applied) = std_mpsc::channel();
        if queue.send(PersistOp::Flush(done)).is_ok() {
            // An error means the writer exited without acknowledging
            applied.recv().ok();
        }
    }
}

impl<V> Drop for PersistWriter<V> {
    fn drop(&mut self) {
        // Closing the queue lets the writer drain what is left and exit
        self.queue.take();
        if let Some(thread) = self.thread.take() {
            if thread.join().is_err() {
                error!("cache writer thread panicked");
            }
        }
    }
}

fn apply<V>(storage: &dyn StorageAdapter<V>, op: PersistOp<V>) {
    let (operation, key, result) = match op {
        PersistOp::Save(key, entry) => {
            let result = storage.save(&key, &entry);
            ("save", key, result)
        }
        PersistOp::Remove(key) => {
            let result = storage.remove(&key);
            ("remove", key, result)
        }
        PersistOp::Clear => ("clear", String::from("*"), storage.clear()),
        PersistOp::Flush(done) => {
            done.send(()).ok();
            return;
        }
    };
    if let Err(err) = result {
        report(operation, &key, &err);
    }
}

fn report(operation: &str, key: &str, err: &CacheError) {
    let retryable = err.is_retryable();
    match err.severity() {
        ErrorSeverity::Warning => {
            warn!(operation, key, retryable, error = %err, "cache persistence failed");
        }
        ErrorSeverity::Error => {
            error!(operation, key, retryable, error = %err, "cache persistence failed");
        }
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for cache::writer.
    use std::collections::BTreeSet;
    use std::time::Duration;

    use parking_lot::Mutex;

    use super::*;
    use crate::cache::config::StorageKind;
    use crate::cache::error::CacheResult;

    #[derive(Default)]
    struct Recording {
        log: Mutex<Vec<String>>,
    }

    impl StorageAdapter<u32> for Recording {
        fn kind(&self) -> StorageKind {
            StorageKind::Session
        }

        fn load_all(&self) -> CacheResult<Vec<(String, CacheEntry<u32>)>> {
            Ok(Vec::new())
        }

        fn save(&self, key: &str, entry: &CacheEntry<u32>) -> CacheResult<()> {
            self.log.lock().push(format!("save {key}={}", entry.data));
            Ok(())
        }

        fn remove(&self, key: &str) -> CacheResult<()> {
            self.log.lock().push(format!("remove {key}"));
            Ok(())
        }

        fn clear(&self) -> CacheResult<()> {
            self.log.lock().push("clear".to_string());
            Err(CacheError::storage("clear", "quota exceeded"))
        }
    }

    fn entry(value: u32) -> CacheEntry<u32> {
        CacheEntry::new(value, 0, Duration::from_secs(10), BTreeSet::new())
    }

    /// Validates that the background writer applies operations in
    /// submission order and that `flush` waits for them.
    ///
    /// Assertions:
    /// - Confirms the log after `flush` matches the submission order.
    /// - Ensures a failing operation does not stop later ones.
    #[test]
    fn test_background_writer_keeps_order() {
        let storage = Arc::new(Recording::default());
        let writer = PersistWriter::spawn(Arc::clone(&storage) as Arc<dyn StorageAdapter<u32>>, "t:");

        writer.submit(PersistOp::Save("a".into(), entry(1)));
        writer.submit(PersistOp::Remove("a".into()));
        writer.submit(PersistOp::Clear);
        writer.submit(PersistOp::Save("a".into(), entry(2)));
        writer.flush();

        assert_eq!(*storage.log.lock(), vec!["save a=1", "remove a", "clear", "save a=2"]);
    }

    /// Validates that dropping the writer drains the queue before returning.
    #[test]
    fn test_drop_drains_queue() {
        let storage = Arc::new(Recording::default());
        let writer = PersistWriter::spawn(Arc::clone(&storage) as Arc<dyn StorageAdapter<u32>>, "t:");
        for value in 0..50 {
            writer.submit(PersistOp::Save(format!("k{value}"), entry(value)));
        }

        drop(writer);

        assert_eq!(storage.log.lock().len(), 50);
    }

    /// Validates that an inline writer applies operations immediately.
    #[test]
    fn test_inline_writer_applies_immediately() {
        let storage = Arc::new(Recording::default());
        let writer = PersistWriter::inline(Arc::clone(&storage) as Arc<dyn StorageAdapter<u32>>);

        writer.submit(PersistOp::Remove("x".into()));

        assert_eq!(*storage.log.lock(), vec!["remove x"]);
        writer.flush();
    }
}
