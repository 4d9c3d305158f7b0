//! Cache Module
//!
//! Provides an in-memory cache whose values are produced by registered
//! update functions and refreshed once or on a fixed interval.

mod engine;
mod registry;
mod store;
mod typed;
mod value;


// Re-export public types
pub use engine::{Cache, LifecycleState, WeakCache};
pub use registry::{UpdateFunc, UpdateRegistry};
pub use store::CacheStore;
pub use typed::TypedCache;
pub use value::CacheValue;
