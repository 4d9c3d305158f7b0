//! Cache Value Module
//!
//! Type-erased value stored under a cache key.

use std::any::Any;
use std::fmt;
use std::sync::Arc;

// == Cache Value ==
/// An opaque, cheaply cloneable cache value.
///
/// Values are replaced as a whole: the store only ever swaps one `Arc` for
/// another, so readers never see a partial write. The empty value is what
/// `Cache::close` leaves behind for every registered key.
#[derive(Clone, Default)]
pub struct CacheValue(Option<Arc<dyn Any + Send + Sync>>);

impl CacheValue {
    // == Constructor ==
    /// Wraps any thread-safe value.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an already shared value without another allocation.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        let value: Arc<dyn Any + Send + Sync> = value;
        Self(Some(value))
    }

    /// The empty value.
    pub fn empty() -> Self {
        Self(None)
    }

    // == Is Empty ==
    /// Returns true for the empty value.
    pub fn is_empty(&self) -> bool {
        self.0.is_none()
    }

    // == Downcast ==
    /// Borrows the inner value if it is a `T`.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.0.as_ref().and_then(|value| value.downcast_ref::<T>())
    }

    /// Returns a shared handle to the inner value if it is a `T`.
    pub fn downcast<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.0.clone().and_then(|value| value.downcast::<T>().ok())
    }

    /// Returns true if the inner value is a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.downcast_ref::<T>().is_some()
    }
}

impl fmt::Debug for CacheValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            Some(_) => f.write_str("CacheValue(..)"),
            None => f.write_str("CacheValue(empty)"),
        }
    }
}
