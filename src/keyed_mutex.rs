use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};

/// A set of async mutexes addressed by key.
///
/// Locks are created lazily on first use. Distinct keys never contend with
/// each other; callers asking for the same key are serialized.
///
/// Each lock guards a per-key value `T` (unit by default), created with
/// `T::default()` alongside the lock. The lock holder can leave data there for
/// whoever acquires the key next.
///
/// Entries are not removed automatically. A long-running process that locks an
/// unbounded key space should call [`prune_idle`](Self::prune_idle)
/// periodically.
pub struct KeyedMutex<T = ()> {
    locks: DashMap<String, Arc<Mutex<T>>>,
}

impl KeyedMutex {
    pub fn new() -> Self {
        Self::default()
    }
}

impl<T> Default for KeyedMutex<T> {
    fn default() -> Self {
        Self {
            locks: DashMap::new(),
        }
    }
}

impl<T> fmt::Debug for KeyedMutex<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyedMutex")
            .field("keys", &self.locks.len())
            .finish()
    }
}

impl<T: Default> KeyedMutex<T> {
    /// Waits for and acquires the lock for `key`.
    ///
    /// The lock is released when the returned guard is dropped.
    pub async fn lock(&self, key: &str) -> OwnedMutexGuard<T> {
        // Clone the Arc out so the shard lock is not held across the await
        let mutex = self
            .locks
            .entry(key.to_string())
            .or_insert_with(|| Arc::new(Mutex::new(T::default())))
            .clone();
        mutex.lock_owned().await
    }
}

impl<T> KeyedMutex<T> {
    /// Number of keys that currently have a lock entry.
    pub fn len(&self) -> usize {
        self.locks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locks.is_empty()
    }

    /// Drops lock entries, with their per-key values, that nobody holds or waits
    /// on. Returns how many were removed.
    pub fn prune_idle(&self) -> usize {
        let before = self.locks.len();
        self.locks.retain(|_, mutex| Arc::strong_count(mutex) > 1);
        before.saturating_sub(self.locks.len())
    }
}
