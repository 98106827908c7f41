//! Per-key mutual exclusion
//!
//! Each wishlist (and each trash handle) can be held by one operation at a
//! time, for its whole read-snapshot-write sequence. Operations on
//! different keys never block each other.

use std::collections::HashSet;

use parking_lot::{Condvar, Mutex};

/// Set of keys currently held, with a condvar to wait for release
#[derive(Debug, Default)]
pub struct KeyedLocks {
    held: Mutex<HashSet<String>>,
    released: Condvar,
}

/// Held lock for one key; released on drop, including on error paths
#[must_use = "the key is released as soon as the guard is dropped"]
pub struct KeyGuard<'a> {
    locks: &'a KeyedLocks,
    key: String,
}

impl KeyedLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Block until `key` is free, then hold it
    pub fn lock(&self, key: &str) -> KeyGuard<'_> {
        let mut held = self.held.lock();
        while held.contains(key) {
            self.released.wait(&mut held);
        }
        held.insert(key.to_string());

        KeyGuard {
            locks: self,
            key: key.to_string(),
        }
    }

    /// Hold `key` if it is free right now
    pub fn try_lock(&self, key: &str) -> Option<KeyGuard<'_>> {
        let mut held = self.held.lock();
        if !held.insert(key.to_string()) {
            return None;
        }
        Some(KeyGuard {
            locks: self,
            key: key.to_string(),
        })
    }
}

impl Drop for KeyGuard<'_> {
    fn drop(&mut self) {
        self.locks.held.lock().remove(&self.key);
        self.locks.released.notify_all();
    }
}
