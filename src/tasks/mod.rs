//! Background Tasks Module
//!
//! Contains background tasks that run periodically while a cache is live.
//!
//! # Tasks
//! - Refresh: Re-runs every registered update function at a fixed interval

mod refresh;

pub use refresh::{run_cycle, RefreshTask};
