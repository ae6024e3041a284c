//! Memoize-on-first-access storage with reentrancy detection.
//!
//! Every lazily computed field in the descriptor graph (supertypes, member
//! scopes, type parameters, module content) is a [`LazyValue`], and every
//! name-indexed memo is a [`MemoizedFunction`]. Both share one contract:
//!
//! - the first access runs the computation exactly once;
//! - concurrent accessors block until that computation finishes and then see
//!   the same value;
//! - a reentrant access from inside the computation gets
//!   [`RecursionDetected`] instead of deadlocking or recursing;
//! - a failed computation leaves the cell unevaluated, so a later access
//!   retries and unrelated cells are untouched.
//!
//! First computations are serialized by one reentrant lock per
//! [`StorageManager`]. Two overlapping computations on different threads can
//! therefore never wait on each other in a cycle, and an `Evaluating` state
//! observed under the lock always belongs to the current thread.

use dashmap::DashMap;
use parking_lot::{Mutex, ReentrantMutex};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::trace;

/// Marker returned to a caller that re-entered a computation already running
/// on its own stack.
///
/// Hierarchy walkers treat it as "no further information".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
#[error("recursion detected while computing a lazy value")]
pub struct RecursionDetected;

// =============================================================================
// StorageManager
// =============================================================================

/// Owner of the first-computation lock shared by a family of lazy cells.
pub struct StorageManager {
    lock: ReentrantMutex<()>,
    debug_name: &'static str,
}

impl StorageManager {
    pub fn new(debug_name: &'static str) -> Arc<Self> {
        Arc::new(StorageManager {
            lock: ReentrantMutex::new(()),
            debug_name,
        })
    }

    pub fn debug_name(&self) -> &'static str {
        self.debug_name
    }

    pub fn lazy<T: Clone>(self: &Arc<Self>) -> LazyValue<T> {
        LazyValue::new(Arc::clone(self))
    }

    pub fn memoized<K: Hash + Eq + Clone, V: Clone>(self: &Arc<Self>) -> MemoizedFunction<K, V> {
        MemoizedFunction::new(Arc::clone(self))
    }
}

impl fmt::Debug for StorageManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StorageManager")
            .field("debug_name", &self.debug_name)
            .finish_non_exhaustive()
    }
}

// =============================================================================
// LazyValue
// =============================================================================

enum CellState<T> {
    Unevaluated,
    Evaluating,
    Evaluated(T),
}

/// A lazily computed, memoized value.
pub struct LazyValue<T> {
    storage: Arc<StorageManager>,
    state: Mutex<CellState<T>>,
    computations: AtomicU32,
}

/// Resets an `Evaluating` cell if the computation unwinds.
struct ResetOnUnwind<'a, T> {
    state: &'a Mutex<CellState<T>>,
    armed: bool,
}

impl<T> Drop for ResetOnUnwind<'_, T> {
    fn drop(&mut self) {
        if self.armed {
            *self.state.lock() = CellState::Unevaluated;
        }
    }
}

impl<T: Clone> LazyValue<T> {
    pub fn new(storage: Arc<StorageManager>) -> Self {
        LazyValue {
            storage,
            state: Mutex::new(CellState::Unevaluated),
            computations: AtomicU32::new(0),
        }
    }

    /// Return the cached value, computing it with `compute` on first access.
    pub fn get_or_compute(&self, compute: impl FnOnce() -> T) -> Result<T, RecursionDetected> {
        self.try_get_or_compute(|| Ok::<T, RecursionDetected>(compute()))
    }

    /// Fallible variant: an `Err` from `compute` is returned to the caller and
    /// the cell goes back to unevaluated.
    pub fn try_get_or_compute<E>(&self, compute: impl FnOnce() -> Result<T, E>) -> Result<T, E>
    where
        E: From<RecursionDetected>,
    {
        if let CellState::Evaluated(value) = &*self.state.lock() {
            return Ok(value.clone());
        }

        let _serialized = self.storage.lock.lock();
        {
            let mut state = self.state.lock();
            match &*state {
                CellState::Evaluated(value) => return Ok(value.clone()),
                CellState::Evaluating => {
                    trace!(storage = self.storage.debug_name, "LazyValue: recursion detected");
                    return Err(RecursionDetected.into());
                }
                CellState::Unevaluated => *state = CellState::Evaluating,
            }
        }

        let mut reset = ResetOnUnwind {
            state: &self.state,
            armed: true,
        };
        self.computations.fetch_add(1, Ordering::Relaxed);
        let result = compute();
        reset.armed = false;

        let mut state = self.state.lock();
        match result {
            Ok(value) => {
                *state = CellState::Evaluated(value.clone());
                Ok(value)
            }
            Err(err) => {
                *state = CellState::Unevaluated;
                Err(err)
            }
        }
    }

    /// The cached value, without computing anything.
    pub fn peek(&self) -> Option<T> {
        match &*self.state.lock() {
            CellState::Evaluated(value) => Some(value.clone()),
            _ => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(&*self.state.lock(), CellState::Evaluated(_))
    }

    /// How many times a computation was started for this cell.
    pub fn computations(&self) -> u32 {
        self.computations.load(Ordering::Relaxed)
    }
}

impl<T> fmt::Debug for LazyValue<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match &*self.state.lock() {
            CellState::Unevaluated => "unevaluated",
            CellState::Evaluating => "evaluating",
            CellState::Evaluated(_) => "evaluated",
        };
        f.debug_struct("LazyValue")
            .field("state", &state)
            .field("computations", &self.computations.load(Ordering::Relaxed))
            .finish()
    }
}

// =============================================================================
// MemoizedFunction
// =============================================================================

/// A function memoized per distinct key, one [`LazyValue`] per key.
pub struct MemoizedFunction<K, V> {
    storage: Arc<StorageManager>,
    cells: DashMap<K, Arc<LazyValue<V>>>,
}

impl<K: Hash + Eq + Clone, V: Clone> MemoizedFunction<K, V> {
    pub fn new(storage: Arc<StorageManager>) -> Self {
        MemoizedFunction {
            storage,
            cells: DashMap::new(),
        }
    }

    fn cell(&self, key: &K) -> Arc<LazyValue<V>> {
        if let Some(cell) = self.cells.get(key) {
            return Arc::clone(cell.value());
        }
        // The shard guard is released before the computation runs; nested
        // lookups on the same map may land in the same shard.
        let cell = self
            .cells
            .entry(key.clone())
            .or_insert_with(|| Arc::new(LazyValue::new(Arc::clone(&self.storage))));
        Arc::clone(cell.value())
    }

    pub fn get_or_compute(
        &self,
        key: &K,
        compute: impl FnOnce(&K) -> V,
    ) -> Result<V, RecursionDetected> {
        self.cell(key).get_or_compute(|| compute(key))
    }

    pub fn try_get_or_compute<E>(
        &self,
        key: &K,
        compute: impl FnOnce(&K) -> Result<V, E>,
    ) -> Result<V, E>
    where
        E: From<RecursionDetected>,
    {
        self.cell(key).try_get_or_compute(|| compute(key))
    }

    pub fn peek(&self, key: &K) -> Option<V> {
        self.cells.get(key).and_then(|cell| cell.peek())
    }

    /// Total computations started across all keys.
    pub fn computations(&self) -> u32 {
        self.cells
            .iter()
            .map(|entry| entry.value().computations())
            .sum()
    }

    /// Number of keys ever requested.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

impl<K: Hash + Eq, V> fmt::Debug for MemoizedFunction<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoizedFunction")
            .field("storage", &self.storage.debug_name)
            .field("keys", &self.cells.len())
            .finish()
    }
}

#[cfg(test)]
#[path = "../tests/storage_tests.rs"]
mod tests;
