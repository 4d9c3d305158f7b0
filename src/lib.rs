//! Refresh Cache - An in-process, periodically refreshed key/value store
//!
//! Values are produced by registered update functions and recomputed once at
//! startup or on a fixed interval by a background task.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;
pub mod topics;

pub use api::AppState;
pub use cache::{Cache, CacheValue, LifecycleState, TypedCache, WeakCache};
pub use config::{CacheConfig, Config};
pub use error::{CacheError, Result};
