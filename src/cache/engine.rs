//! Refresh Cache Engine
//!
//! Ties the store, the update registry and the background refresh task
//! together behind a start/close lifecycle.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::cache::{CacheStore, CacheValue, UpdateRegistry};
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::{self, RefreshTask};

// == Lifecycle State ==
/// Where a cache is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    /// Constructed, no refresh cycle run yet
    Idle,
    /// Background refresh task spawned (interval mode)
    Running,
    /// Background task ended without a close, e.g. on host cancellation.
    /// Data and registrations are kept; the cache may be started again.
    Stopped,
    /// Loaded once, no background task (one-shot mode)
    OneShotDone,
    /// Stopped for good
    Closed,
}

// == Cache ==
/// A periodically refreshed key/value cache.
///
/// `Cache` is a cheap handle: clones share the same store, registry and
/// refresh task. Reads never wait on a refresh in flight.
///
/// Dropping the last handle stops the refresh task. An update function that
/// captures a `Cache` is itself such a handle and keeps the cache alive, so
/// functions reading the cache they refresh should capture a [`WeakCache`]
/// from [`Cache::downgrade`], or the owner must call [`Cache::close`].
///
/// # Example
/// ```ignore
/// let cache = Cache::new(CacheConfig::every(Duration::from_secs(5)))?;
/// cache.add_update_func("main_topic", || Ok(CacheValue::new(fetch_topic()?)))?;
///
/// let weak = cache.downgrade();
/// cache.add_update_func("topic_count", move || {
///     let cache = weak.upgrade().context("cache dropped")?;
///     Ok(CacheValue::new(cache.registered_keys().len()))
/// })?;
///
/// let (tx, mut rx) = tokio::sync::mpsc::channel(16);
/// cache.start_and_manage_updates(shutdown.clone(), tx).await?;
/// // Later:
/// cache.close().await;
/// ```
#[derive(Clone, Debug)]
pub struct Cache {
    inner: Arc<CacheInner>,
}

#[derive(Debug)]
struct CacheInner {
    store: Arc<CacheStore>,
    registry: Arc<UpdateRegistry>,
    config: CacheConfig,
    state: Mutex<LifecycleState>,
    stop: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Drop for CacheInner {
    fn drop(&mut self) {
        // The refresh task only holds the store and registry, so it has to be
        // told when the last handle goes away.
        self.stop.cancel();
    }
}

// == Weak Cache ==
/// A handle that does not keep its [`Cache`] alive.
#[derive(Clone, Debug)]
pub struct WeakCache {
    inner: Weak<CacheInner>,
}

impl WeakCache {
    /// Returns a full handle, `None` once every `Cache` handle was dropped.
    pub fn upgrade(&self) -> Option<Cache> {
        self.inner.upgrade().map(|inner| Cache { inner })
    }
}

impl Cache {
    // == Constructor ==
    /// Creates an empty cache.
    ///
    /// Fails with `CacheError::InvalidInterval` if an interval is configured
    /// and it is zero.
    pub fn new(config: CacheConfig) -> Result<Self> {
        if let Some(interval) = config.update_interval {
            if interval.is_zero() {
                warn!("Invalid cache update interval given: {:?}", interval);
                return Err(CacheError::InvalidInterval(interval));
            }
        }

        debug!("Cache created with update interval {:?}", config.update_interval);

        Ok(Self {
            inner: Arc::new(CacheInner {
                store: Arc::new(CacheStore::new()),
                registry: Arc::new(UpdateRegistry::new()),
                config,
                state: Mutex::new(LifecycleState::Idle),
                stop: CancellationToken::new(),
                task: Mutex::new(None),
            }),
        })
    }

    // == Accessors ==
    pub fn config(&self) -> CacheConfig {
        self.inner.config
    }

    pub fn state(&self) -> LifecycleState {
        *self.lock_state()
    }

    /// Returns a [`WeakCache`] for use inside update functions.
    pub fn downgrade(&self) -> WeakCache {
        WeakCache {
            inner: Arc::downgrade(&self.inner),
        }
    }

    /// Returns true while the background refresh task is alive.
    pub fn is_refreshing(&self) -> bool {
        self.lock_task()
            .as_ref()
            .is_some_and(|handle| !handle.is_finished())
    }

    /// Keys that currently have an update function.
    pub fn registered_keys(&self) -> Vec<String> {
        self.inner.registry.keys()
    }

    // == Get / Set ==
    /// Retrieves the value stored under `key`, `None` if never written.
    pub fn get(&self, key: &str) -> Option<CacheValue> {
        self.inner.store.get(key)
    }

    /// Stores `value` under `key`.
    pub fn set(&self, key: impl Into<String>, value: CacheValue) {
        self.inner.store.set(key, value);
    }

    // == Add Update Func ==
    /// Registers the update function for `key`, replacing any previous one.
    ///
    /// Safe to call at any time before the cache is closed; a function added
    /// while running is picked up from the next refresh cycle.
    pub fn add_update_func<F>(&self, key: impl Into<String>, func: F) -> Result<()>
    where
        F: Fn() -> anyhow::Result<CacheValue> + Send + Sync + 'static,
    {
        let state = self.lock_state();
        if *state == LifecycleState::Closed {
            return Err(CacheError::Closed);
        }
        self.inner.registry.add(key, func);
        Ok(())
    }

    // == Update Content ==
    /// Runs one refresh cycle synchronously.
    ///
    /// See [`UpdateRegistry::update_content`] for the failure semantics:
    /// earlier writes of a failing cycle are not rolled back.
    pub fn update_content(&self) -> Result<()> {
        self.inner.registry.update_content(&self.inner.store)
    }

    // == Start Updates ==
    /// Starts refreshing the cache.
    ///
    /// In one-shot mode every update function runs once, synchronously, and
    /// the result of that cycle is returned. In interval mode a background
    /// task refreshes the cache every interval (first refresh after one full
    /// interval) and pushes each failed cycle to `errors` without blocking.
    /// The task exits when the cache is closed or `cancel` fires.
    ///
    /// Calling this on a cache that already started is a no-op. Interval
    /// mode with no registered functions is also a no-op. A cache whose task
    /// ended on host cancellation can be started again with a new token.
    pub fn start_updates(
        &self,
        cancel: CancellationToken,
        errors: mpsc::Sender<CacheError>,
    ) -> Result<()> {
        let mut state = self.lock_state();
        match *state {
            LifecycleState::Closed => return Err(CacheError::Closed),
            LifecycleState::Running | LifecycleState::OneShotDone => {
                debug!("Cache updates already started");
                return Ok(());
            }
            LifecycleState::Idle | LifecycleState::Stopped => {}
        }

        let Some(interval) = self.inner.config.update_interval else {
            *state = LifecycleState::OneShotDone;
            drop(state);
            debug!("Loading cache once");
            return self.update_content();
        };

        if self.inner.registry.is_empty() {
            debug!("No update functions registered, not starting cache updates");
            return Ok(());
        }

        let handle = RefreshTask {
            store: self.inner.store.clone(),
            registry: self.inner.registry.clone(),
            interval,
            stop: self.inner.stop.clone(),
            cancel,
            errors,
        }
        .spawn();

        *self.lock_task() = Some(handle);
        *state = LifecycleState::Running;
        Ok(())
    }

    // == Start And Manage Updates ==
    /// Loads the cache immediately, then hands over to [`Cache::start_updates`].
    ///
    /// The initial load runs on the blocking pool. If it fails the cache is
    /// shut down and the error returned; no background task is started. A
    /// cache that already started is left alone, without another load.
    pub async fn start_and_manage_updates(
        &self,
        cancel: CancellationToken,
        errors: mpsc::Sender<CacheError>,
    ) -> Result<()> {
        match self.state() {
            LifecycleState::Closed => return Err(CacheError::Closed),
            LifecycleState::Running | LifecycleState::OneShotDone => {
                debug!("Cache updates already started");
                return Ok(());
            }
            LifecycleState::Idle | LifecycleState::Stopped => {}
        }

        let loaded = tasks::run_cycle(self.inner.store.clone(), self.inner.registry.clone()).await;
        if let Err(err) = loaded {
            warn!("Initial cache load failed, closing cache: {}", err);
            *self.lock_state() = LifecycleState::Closed;
            self.shut_down().await;
            return Err(err);
        }

        if self.inner.config.update_interval.is_none() {
            let mut state = self.lock_state();
            if *state == LifecycleState::Idle {
                *state = LifecycleState::OneShotDone;
            }
            return Ok(());
        }

        self.start_updates(cancel, errors)
    }

    // == Close ==
    /// Stops the refresh task and wipes the cache.
    ///
    /// Every registered key is reset to the empty value and the registry is
    /// emptied. Waits for a refresh cycle in flight, so no write lands after
    /// the reset. Only a started interval cache is closed, whether its task
    /// is still running or ended on host cancellation: on a cache that was
    /// never started, a one-shot cache or an already closed one this is a
    /// no-op. Host cancellation alone never wipes anything.
    pub async fn close(&self) {
        {
            let mut state = self.lock_state();
            match *state {
                LifecycleState::Running | LifecycleState::Stopped => {
                    *state = LifecycleState::Closed;
                }
                LifecycleState::Idle | LifecycleState::OneShotDone | LifecycleState::Closed => {
                    debug!("Cache not started, nothing to close");
                    return;
                }
            }
        }

        self.shut_down().await;
    }

    /// Stops the task and, in interval mode, wipes every registered key.
    /// The state must already be `Closed`.
    async fn shut_down(&self) {
        self.inner.stop.cancel();

        let handle = self.lock_task().take();
        if let Some(handle) = handle {
            if let Err(err) = handle.await {
                warn!("Refresh task ended abnormally: {}", err);
            }
        }

        if self.inner.config.update_interval.is_none() {
            info!("Cache closed");
            return;
        }

        let keys = self.inner.registry.clear();
        for key in &keys {
            self.inner.store.reset(key.as_str());
        }

        info!("Cache closed, {} keys reset", keys.len());
    }

    /// Locks the state, first moving a `Running` cache whose task has ended
    /// to `Stopped`.
    fn lock_state(&self) -> MutexGuard<'_, LifecycleState> {
        let mut state = self.inner.state.lock().unwrap_or_else(PoisonError::into_inner);
        if *state == LifecycleState::Running && !self.is_refreshing() {
            debug!("Cache refresh task ended without close");
            *state = LifecycleState::Stopped;
        }
        state
    }

    fn lock_task(&self) -> MutexGuard<'_, Option<JoinHandle<()>>> {
        self.inner.task.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
