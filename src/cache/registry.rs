//! Update Registry Module
//!
//! Holds one update function per cache key and runs refresh cycles.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::cache::{CacheStore, CacheValue};
use crate::error::{CacheError, Result};

/// A zero-argument producer of a fresh value for one key.
pub type UpdateFunc = Arc<dyn Fn() -> anyhow::Result<CacheValue> + Send + Sync>;

// == Update Registry ==
/// Registry of update functions keyed by cache key.
///
/// Registration and refresh cycles may run concurrently: a cycle works on a
/// snapshot taken under the read lock and calls the functions with no lock
/// held, so an update function may itself register functions or read the
/// cache.
#[derive(Default)]
pub struct UpdateRegistry {
    funcs: RwLock<BTreeMap<String, UpdateFunc>>,
}

impl UpdateRegistry {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    // == Add ==
    /// Registers `func` for `key`, replacing any previous function.
    pub fn add<F>(&self, key: impl Into<String>, func: F)
    where
        F: Fn() -> anyhow::Result<CacheValue> + Send + Sync + 'static,
    {
        self.write().insert(key.into(), Arc::new(func));
    }

    // == Lookup ==
    /// Returns the function registered for `key`.
    pub fn get(&self, key: &str) -> Option<UpdateFunc> {
        self.read().get(key).cloned()
    }

    /// Returns the registered keys in refresh order.
    pub fn keys(&self) -> Vec<String> {
        self.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    // == Clear ==
    /// Empties the registry and returns the keys it held.
    pub fn clear(&self) -> Vec<String> {
        std::mem::take(&mut *self.write()).into_keys().collect()
    }

    // == Update Content ==
    /// Runs one refresh cycle: calls every registered function and stores
    /// each result under its key.
    ///
    /// Keys are visited in lexicographic order. The cycle stops at the first
    /// failing function and returns `CacheError::Update` naming its key.
    /// Values already written earlier in the same cycle are kept.
    pub fn update_content(&self, store: &CacheStore) -> Result<()> {
        for (key, func) in self.snapshot() {
            match func() {
                Ok(value) => store.set(key, value),
                Err(source) => return Err(CacheError::Update { key, source }),
            }
        }
        Ok(())
    }

    fn snapshot(&self) -> Vec<(String, UpdateFunc)> {
        self.read()
            .iter()
            .map(|(key, func)| (key.clone(), func.clone()))
            .collect()
    }

    fn read(&self) -> RwLockReadGuard<'_, BTreeMap<String, UpdateFunc>> {
        self.funcs.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, BTreeMap<String, UpdateFunc>> {
        self.funcs.write().unwrap_or_else(PoisonError::into_inner)
    }
}

impl fmt::Debug for UpdateRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpdateRegistry")
            .field("keys", &self.keys())
            .finish()
    }
}
