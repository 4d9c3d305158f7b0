//! Typed Cache Module
//!
//! Thin adapter giving typed access to a [`Cache`] for one value type.

use std::any::{self, Any};
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use crate::cache::{Cache, CacheValue};
use crate::error::{CacheError, Result};

// == Typed Cache ==
/// A view of a [`Cache`] whose values are all `T`.
///
/// The type check happens here, at read time: a value of another type is
/// reported as `CacheError::TypeMismatch`, and the empty value left by
/// `close` as `CacheError::Empty`.
pub struct TypedCache<T> {
    cache: Cache,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Any + Send + Sync> TypedCache<T> {
    pub fn new(cache: Cache) -> Self {
        Self {
            cache,
            _marker: PhantomData,
        }
    }

    /// The underlying untyped cache, for lifecycle calls.
    pub fn cache(&self) -> &Cache {
        &self.cache
    }

    // == Get ==
    /// Retrieves the `T` stored under `key`.
    pub fn get(&self, key: &str) -> Result<Arc<T>> {
        let value = self
            .cache
            .get(key)
            .ok_or_else(|| CacheError::NotFound(key.to_string()))?;

        if value.is_empty() {
            return Err(CacheError::Empty(key.to_string()));
        }

        value.downcast::<T>().ok_or_else(|| CacheError::TypeMismatch {
            key: key.to_string(),
            expected: any::type_name::<T>(),
        })
    }

    // == Set ==
    pub fn set(&self, key: impl Into<String>, value: T) {
        self.cache.set(key, CacheValue::new(value));
    }

    // == Add Update Func ==
    /// Registers a typed update function for `key`.
    pub fn add_update_func<F>(&self, key: impl Into<String>, func: F) -> Result<()>
    where
        F: Fn() -> anyhow::Result<T> + Send + Sync + 'static,
    {
        self.cache
            .add_update_func(key, move || func().map(CacheValue::new))
    }
}

impl<T> Clone for TypedCache<T> {
    fn clone(&self) -> Self {
        Self {
            cache: self.cache.clone(),
            _marker: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TypedCache<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TypedCache")
            .field("type", &any::type_name::<T>())
            .field("cache", &self.cache)
            .finish()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;
    use std::time::Duration;

    #[derive(Debug, PartialEq)]
    struct Topic {
        id: u32,
    }

    fn typed_cache(config: CacheConfig) -> TypedCache<Topic> {
        TypedCache::new(Cache::new(config).unwrap())
    }

    #[test]
    fn test_typed_get() {
        let topics = typed_cache(CacheConfig::once());

        topics.set("main_topic", Topic { id: 1 });

        assert_eq!(*topics.get("main_topic").unwrap(), Topic { id: 1 });
    }

    #[test]
    fn test_typed_get_not_found() {
        let topics = typed_cache(CacheConfig::once());

        let err = topics.get("missing").unwrap_err();
        assert!(matches!(err, CacheError::NotFound(key) if key == "missing"));
    }

    #[test]
    fn test_typed_get_type_mismatch() {
        let topics = typed_cache(CacheConfig::once());

        topics.cache().set("main_topic", CacheValue::new("not a topic"));

        let err = topics.get("main_topic").unwrap_err();
        assert!(matches!(err, CacheError::TypeMismatch { ref key, .. } if key == "main_topic"));
        assert!(err.to_string().contains("Topic"));
    }

    #[test]
    fn test_typed_update_func() {
        let topics = typed_cache(CacheConfig::once());

        topics
            .add_update_func("main_topic", || Ok(Topic { id: 7 }))
            .unwrap();
        topics.cache().update_content().unwrap();

        assert_eq!(topics.get("main_topic").unwrap().id, 7);
    }

    #[tokio::test]
    async fn test_typed_get_after_close_is_empty() {
        let topics = typed_cache(CacheConfig::every(Duration::from_secs(60)));

        topics
            .add_update_func("main_topic", || Ok(Topic { id: 7 }))
            .unwrap();
        let (tx, _rx) = tokio::sync::mpsc::channel(1);
        topics
            .cache()
            .start_and_manage_updates(tokio_util::sync::CancellationToken::new(), tx)
            .await
            .unwrap();
        assert_eq!(topics.get("main_topic").unwrap().id, 7);
        topics.cache().close().await;

        let err = topics.get("main_topic").unwrap_err();
        assert!(matches!(err, CacheError::Empty(key) if key == "main_topic"));
    }
}
