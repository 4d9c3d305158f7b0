//! Refresh Task
//!
//! Background task that periodically re-runs the registered update functions.

use std::panic;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::task::{self, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, UpdateRegistry};
use crate::error::{CacheError, Result};

/// Runs one refresh cycle on the blocking thread pool.
///
/// Update functions are plain synchronous closures that may sit on network
/// calls, so they never run on an async worker. A panic inside an update
/// function is resumed on the caller.
pub async fn run_cycle(store: Arc<CacheStore>, registry: Arc<UpdateRegistry>) -> Result<()> {
    match task::spawn_blocking(move || registry.update_content(&store)).await {
        Ok(result) => result,
        Err(err) if err.is_panic() => panic::resume_unwind(err.into_panic()),
        // Only happens while the runtime shuts down
        Err(_) => Err(CacheError::Closed),
    }
}

/// Everything the refresh loop needs, handed over at spawn time.
///
/// The task holds the store and registry but not the `Cache` handle itself,
/// so dropping the last handle is enough to stop it.
#[derive(Debug)]
pub struct RefreshTask {
    pub store: Arc<CacheStore>,
    pub registry: Arc<UpdateRegistry>,
    /// Period between refresh cycles, first cycle after one full period
    pub interval: Duration,
    /// Cache-owned stop signal
    pub stop: CancellationToken,
    /// Host-owned cancellation
    pub cancel: CancellationToken,
    /// Sink for failed cycles
    pub errors: mpsc::Sender<CacheError>,
}

impl RefreshTask {
    /// Spawns the refresh loop.
    ///
    /// The loop exits on whichever comes first of `stop` and `cancel`, and
    /// never starts a refresh cycle once either has fired. A cycle in flight
    /// is always awaited before the loop looks at either token again, so the
    /// task completes only after its last write. A failed cycle is
    /// sent to `errors` with `try_send`: when the sink is full the error is
    /// dropped instead of stalling the schedule.
    ///
    /// # Returns
    /// A JoinHandle for the spawned task. It completes once the loop has
    /// exited, so awaiting it guarantees no further writes.
    pub fn spawn(self) -> JoinHandle<()> {
        let start = Instant::now() + self.interval;

        tokio::spawn(async move {
            info!(
                "Starting cache refresh task with interval of {:?} for {} keys",
                self.interval,
                self.registry.len()
            );

            let mut ticker = time::interval_at(start, self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    biased;

                    _ = self.stop.cancelled() => {
                        debug!("Cache refresh task stopped");
                        break;
                    }
                    _ = self.cancel.cancelled() => {
                        debug!("Cache refresh task cancelled");
                        break;
                    }
                    _ = ticker.tick() => self.refresh().await,
                }
            }
        })
    }

    async fn refresh(&self) {
        match run_cycle(self.store.clone(), self.registry.clone()).await {
            Ok(()) => debug!("Cache refresh cycle complete"),
            Err(err) => match self.errors.try_send(err) {
                Ok(()) => {}
                Err(TrySendError::Full(err)) => {
                    warn!("Error channel full, dropping cache refresh error: {}", err);
                }
                Err(TrySendError::Closed(err)) => {
                    debug!("Error channel closed, dropping cache refresh error: {}", err);
                }
            },
        }
    }
}
