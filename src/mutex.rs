//! Keyed asynchronous mutual exclusion.
//!
//! Serializes async actions sharing a logical key: at most one action per
//! key runs at a time, waiters are served FIFO, and different keys never
//! block each other. The lock table only holds keys with a running or
//! waiting action.

use std::collections::HashMap;
use std::future::Future;
use std::hash::Hash;
use std::sync::{Arc, OnceLock};

use parking_lot::Mutex;

struct LockEntry {
    lock: Arc<tokio::sync::Mutex<()>>,
    /// Holder plus waiters. The entry is removed when this drops to zero.
    users: usize,
}

/// Per-key exclusive executor.
pub struct KeyedMutex<K> {
    table: Mutex<HashMap<K, LockEntry>>,
}

impl<K> Default for KeyedMutex<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K> KeyedMutex<K>
where
    K: Eq + Hash + Clone + std::fmt::Debug,
{
    pub fn new() -> Self {
        Self {
            table: Mutex::new(HashMap::new()),
        }
    }

    /// Runs `action` once no earlier action for `key` is pending.
    ///
    /// The outcome of the earlier action is ignored; this call's own output
    /// (including an `Err`) is returned unchanged. A started action always
    /// runs to completion unless the returned future itself is dropped.
    pub async fn run_exclusive<F, T>(&self, key: K, action: F) -> T
    where
        F: Future<Output = T>,
    {
        let (lock, queued) = self.acquire_entry(&key);

        // Release our slot in the table even if the action panics or this
        // future is dropped while waiting.
        scopeguard::defer! {
            self.release_entry(&key);
        }

        if queued > 0 {
            tracing::trace!(key = ?key, queued, "Waiting for pending action on key");
        }
        let _permit = lock.lock().await;
        tracing::trace!(key = ?key, "Running exclusive action");
        action.await
    }

    /// Number of keys with a running or waiting action.
    pub fn pending_keys(&self) -> usize {
        self.table.lock().len()
    }

    pub fn is_pending(&self, key: &K) -> bool {
        self.table.lock().contains_key(key)
    }

    /// Registers a user for `key`; returns the lock and how many users were
    /// already registered ahead of this one.
    fn acquire_entry(&self, key: &K) -> (Arc<tokio::sync::Mutex<()>>, usize) {
        let mut table = self.table.lock();
        let entry = table.entry(key.clone()).or_insert_with(|| LockEntry {
            lock: Arc::new(tokio::sync::Mutex::new(())),
            users: 0,
        });
        let ahead = entry.users;
        entry.users += 1;
        (entry.lock.clone(), ahead)
    }

    fn release_entry(&self, key: &K) {
        let mut table = self.table.lock();
        let remove = match table.get_mut(key) {
            Some(entry) => {
                entry.users -= 1;
                entry.users == 0
            }
            None => false,
        };
        if remove {
            table.remove(key);
        }
    }
}

impl KeyedMutex<String> {
    /// Process-wide instance shared by every engine.
    ///
    /// Keys are global: build them with [`namespaced_key`].
    pub fn global() -> &'static KeyedMutex<String> {
        static GLOBAL: OnceLock<KeyedMutex<String>> = OnceLock::new();
        GLOBAL.get_or_init(KeyedMutex::new)
    }
}

/// Runs `action` exclusively for `key` on the global mutex.
pub async fn execute_sequentially<F, T>(key: impl Into<String>, action: F) -> T
where
    F: Future<Output = T>,
{
    KeyedMutex::global().run_exclusive(key.into(), action).await
}

/// `"namespace:id"` key for the global mutex.
pub fn namespaced_key(namespace: &str, id: impl std::fmt::Display) -> String {
    format!("{}:{}", namespace, id)
}
