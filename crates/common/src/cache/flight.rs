//! Per-key in-flight registry for coalesced loads

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

type Gate = Arc<tokio::sync::Mutex<()>>;

/// Async gates keyed by cache key
///
/// Callers loading the same key queue on one gate. The gate is dropped from
/// the registry once nobody holds it.
#[derive(Debug, Default)]
pub(crate) struct InFlight {
    gates: Mutex<HashMap<String, Gate>>,
}

impl InFlight {
    /// Join the flight for `key`
    ///
    /// The returned guard releases the gate when dropped, including when the
    /// caller's future is cancelled mid-load.
    pub(crate) fn join<'a>(&'a self, key: &'a str) -> Flight<'a> {
        Flight { registry: self, key, gate: Some(self.gate(key)) }
    }

    /// Gate for `key`, created on first use
    fn gate(&self, key: &str) -> Gate {
        let mut gates = self.gates.lock();
        Arc::clone(gates.entry(key.to_string()).or_default())
    }

    /// Give back one holder's gate, dropping it from the registry when no
    /// other holder remains
    ///
    /// Every clone is taken and given back under the registry lock, so the
    /// strong count read here is exact.
    fn release(&self, key: &str, gate: Gate) {
        let mut gates = self.gates.lock();
        drop(gate);
        if gates.get(key).is_some_and(|current| Arc::strong_count(current) == 1) {
            gates.remove(key);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.gates.lock().len()
    }
}

/// Membership in one key's flight
pub(crate) struct Flight<'a> {
    registry: &'a InFlight,
    key: &'a str,
    gate: Option<Gate>,
}

impl Flight<'_> {
    /// Wait for this caller's turn to load
    pub(crate) async fn turn(&self) -> Option<tokio::sync::MutexGuard<'_, ()>> {
        match &self.gate {
            Some(gate) => Some(gate.lock().await),
            None => None,
        }
    }
}

impl Drop for Flight<'_> {
    fn drop(&mut self) {
        if let Some(gate) = self.gate.take() {
            self.registry.release(self.key, gate);
        }
    }
}
