//! Cache Store Module
//!
//! Concurrent key/value storage backing the refresh cache.

use dashmap::DashMap;

use crate::cache::CacheValue;

// == Cache Store ==
/// Concurrent map from string keys to opaque values.
///
/// Safe to share between any number of readers and writers without an
/// external lock. Each key is replaced atomically; there is no ordering
/// between different keys.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Key-value storage
    entries: DashMap<String, CacheValue>,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    // == Get ==
    /// Retrieves the value stored under `key`.
    ///
    /// Returns `None` only if the key was never written.
    pub fn get(&self, key: &str) -> Option<CacheValue> {
        self.entries.get(key).map(|entry| entry.value().clone())
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any previous value.
    pub fn set(&self, key: impl Into<String>, value: CacheValue) {
        self.entries.insert(key.into(), value);
    }

    // == Reset ==
    /// Replaces the value under `key` with the empty value.
    pub fn reset(&self, key: impl Into<String>) {
        self.set(key, CacheValue::empty());
    }

    // == Contains ==
    /// Returns true if `key` was ever written.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    // == Keys ==
    /// Returns a snapshot of all keys, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = self.entries.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    // == Length ==
    /// Returns the current number of keys in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if no key was ever written.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
