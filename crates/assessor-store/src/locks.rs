//! Per-candidate locking.
//!
//! Each candidate id gets its own `tokio` read-write lock. The outer map is
//! only locked long enough to find or create an entry, so work on different
//! candidates never waits on each other.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::{OwnedRwLockWriteGuard, RwLock};

/// A map of independently locked slots keyed by candidate id.
#[derive(Debug)]
pub struct KeyedLocks<T> {
    slots: Mutex<HashMap<String, Arc<RwLock<T>>>>,
}

impl<T> Default for KeyedLocks<T> {
    fn default() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }
}

impl<T: Default> KeyedLocks<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The slot for `key`, created on first use.
    pub fn slot(&self, key: &str) -> Arc<RwLock<T>> {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(slots.entry(key.to_string()).or_default())
    }

    /// The slot for `key` if one was ever created.
    pub fn existing(&self, key: &str) -> Option<Arc<RwLock<T>>> {
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.get(key).cloned()
    }

    /// Exclusive access to the slot for `key`.
    pub async fn write(&self, key: &str) -> OwnedRwLockWriteGuard<T> {
        self.slot(key).write_owned().await
    }

    /// Drop the slot for `key` when nobody else holds or waits on it.
    ///
    /// Only for slots whose value carries no state, since a released slot
    /// comes back as `T::default()`.
    pub fn release(&self, key: &str) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        if slots.get(key).is_some_and(|slot| Arc::strong_count(slot) == 1) {
            slots.remove(key);
        }
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
