use std::sync::Arc;

use indexmap::IndexMap;
use parking_lot::Mutex;

use crate::{DrainError, Drainer, Metric};

type Store = IndexMap<String, Vec<Metric>>;

/// A drainer that records metrics in memory, for testing.
///
/// Metrics are grouped by name, in the order their names were first seen, and every drained metric
/// is kept: nothing is deduplicated or aggregated.
///
/// `LocalStoreDrain` is a handle: clones share the same store, so a test can install one clone as
/// the drainer and inspect another.
#[derive(Clone, Debug, Default)]
pub struct LocalStoreDrain {
    store: Arc<Mutex<Option<Store>>>,
}

impl LocalStoreDrain {
    /// Creates a new, empty `LocalStoreDrain`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Takes a snapshot of every recorded metric, keyed by name.
    ///
    /// The store is created on first access.
    pub fn store(&self) -> IndexMap<String, Vec<Metric>> {
        let mut store = self.store.lock();
        store.get_or_insert_with(IndexMap::new).clone()
    }

    /// Gets every metric recorded under the given name, oldest first.
    pub fn get(&self, name: &str) -> Vec<Metric> {
        self.store.lock().as_ref().and_then(|store| store.get(name)).cloned().unwrap_or_default()
    }

    /// Gets the total number of recorded metrics.
    pub fn len(&self) -> usize {
        self.store.lock().as_ref().map_or(0, |store| store.values().map(Vec::len).sum())
    }

    /// Returns `true` if no metrics have been recorded.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clears all recorded metrics.
    ///
    /// Flushing an empty store does nothing.
    pub fn flush(&self) {
        *self.store.lock() = None;
    }
}

impl Drainer for LocalStoreDrain {
    fn drain(&self, metric: Metric) -> Result<(), DrainError> {
        let mut store = self.store.lock();
        store
            .get_or_insert_with(IndexMap::new)
            .entry(metric.name().to_owned())
            .or_default()
            .push(metric);
        Ok(())
    }
}
