//! Load orchestrator.
//!
//! Runs one load node: consult the session cache, otherwise ask the
//! node's observer, record the outcome, fire `onload`, then continue the
//! chain. Chained loads start only after their predecessor succeeded.

use crate::monitor::LoadMonitor;
use fontload_cache::SessionCache;
use fontload_core::{CacheKey, ChainPolicy, LoadError, LoadNode, LoadSlot, LoaderConfig};
use futures::future::{BoxFuture, FutureExt};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::{JoinError, JoinSet};

/// Boxed load future, independent of any borrow
pub type LoadFuture = BoxFuture<'static, Result<(), LoadError>>;

/// Background loads and the errors of those already reaped
#[derive(Default)]
struct Detached {
    tasks: JoinSet<Result<(), LoadError>>,
    errors: Vec<LoadError>,
}

impl Detached {
    /// Drop finished tasks, keeping their errors
    fn reap(&mut self) {
        while let Some(joined) = self.tasks.try_join_next() {
            if let Some(err) = failure(joined) {
                self.errors.push(err);
            }
        }
    }
}

fn failure(joined: Result<Result<(), LoadError>, JoinError>) -> Option<LoadError> {
    match joined {
        Ok(Ok(())) => None,
        Ok(Err(err)) => Some(err),
        Err(join) => Some(LoadError::Aborted {
            reason: join.to_string(),
        }),
    }
}

/// Executes load nodes against a session cache.
///
/// Cloning is cheap; clones share the cache, the monitor and the set of
/// detached tasks.
#[derive(Clone)]
pub struct Orchestrator {
    /// Session cache
    cache: Arc<dyn SessionCache>,
    /// Write `false` entries for failed loads
    cache_failures: bool,
    /// Chain contract
    chain_policy: ChainPolicy,
    /// Load counters
    monitor: Arc<LoadMonitor>,
    /// Background loads not yet settled
    detached: Arc<Mutex<Detached>>,
}

impl Orchestrator {
    /// Create an orchestrator with the config's cache and chain policies
    #[must_use]
    pub fn new(cache: Arc<dyn SessionCache>, config: &LoaderConfig) -> Self {
        Self {
            cache,
            cache_failures: config.cache_failures,
            chain_policy: config.chain_policy,
            monitor: Arc::new(LoadMonitor::new()),
            detached: Arc::new(Mutex::new(Detached::default())),
        }
    }

    /// Share an existing monitor
    #[must_use]
    pub fn with_monitor(mut self, monitor: Arc<LoadMonitor>) -> Self {
        self.monitor = monitor;
        self
    }

    /// Load counters
    #[must_use]
    pub fn monitor(&self) -> &Arc<LoadMonitor> {
        &self.monitor
    }

    /// Load one slot. Absent slots fail with [`LoadError::MissingObserver`]
    /// without touching the cache.
    pub fn load_slot(&self, slot: LoadSlot) -> LoadFuture {
        let this = self.clone();
        async move {
            let node = slot.into_node().inspect_err(|_| {
                this.monitor.record_missing();
                tracing::warn!("rejecting font request without a name");
            })?;
            this.load_node(node).await
        }
        .boxed()
    }

    /// Load one node, then its chain according to the chain policy
    ///
    /// # Errors
    ///
    /// Returns the observer's error for this node. Under
    /// [`ChainPolicy::Joined`] the first chained error is returned too.
    pub async fn load_node(&self, node: LoadNode) -> Result<(), LoadError> {
        let LoadNode {
            name,
            observer,
            cache_key,
            timeout,
            text,
            onload,
            next,
        } = node;
        self.monitor.record_start();

        let outcome = if self.cache.is_loaded(cache_key.as_str()) {
            self.monitor.record_cache_hit();
            tracing::debug!(font = %name, key = %cache_key, "font already loaded this session");
            Ok(())
        } else {
            self.monitor.record_observation();
            tracing::debug!(font = %name, %timeout, "observing font");
            observer
                .load(text.as_deref(), timeout.as_duration())
                .await
                .map_err(|err| LoadError::from_observe(&name, timeout, err))
        };

        self.settle_cache(&cache_key, &outcome);

        if let Err(err) = outcome {
            self.monitor.record_failure();
            tracing::warn!(font = %name, error = %err, "font load failed");
            return Err(err);
        }

        self.monitor.record_completion();
        tracing::info!(font = %name, "font loaded");

        if let Some(onload) = &onload {
            onload.call();
        }

        match next {
            Some(next) => self.follow(*next).await,
            None => Ok(()),
        }
    }

    /// Write the cache entry for a settled node
    fn settle_cache(&self, key: &CacheKey, outcome: &Result<(), LoadError>) {
        match outcome {
            Ok(()) => self.cache.set(key.as_str(), true),
            Err(_) if self.cache_failures => self.cache.set(key.as_str(), false),
            Err(_) => {}
        }
    }

    /// Start the chained successor of a successful node
    async fn follow(&self, next: LoadSlot) -> Result<(), LoadError> {
        self.monitor.record_chain();
        let chained = self.load_slot(next);

        match self.chain_policy {
            ChainPolicy::Joined => chained.await,
            ChainPolicy::Detached => match self.detach(chained) {
                None => Ok(()),
                Some(chained) => {
                    tracing::warn!("no tokio runtime for detached chain, awaiting it inline");
                    chained.await
                }
            },
        }
    }

    /// Run `work` as a background task tracked for [`Self::settle_detached`].
    ///
    /// Returns the work unchanged when no tokio runtime is available.
    pub fn detach(&self, work: LoadFuture) -> Option<LoadFuture> {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            return Some(work);
        };

        let mut detached = lock(&self.detached);
        detached.reap();
        detached.tasks.spawn_on(
            async move {
                let result = work.await;
                if let Err(err) = &result {
                    tracing::warn!(error = %err, "detached font load failed");
                }
                result
            },
            &runtime,
        );
        None
    }

    /// Number of background loads still running
    #[must_use]
    pub fn pending_detached(&self) -> usize {
        let mut detached = lock(&self.detached);
        detached.reap();
        detached.tasks.len()
    }

    /// Wait for every background load, including ones spawned while
    /// waiting, and return their errors in completion order.
    ///
    /// Dropping this future aborts the loads it was waiting on.
    pub async fn settle_detached(&self) -> Vec<LoadError> {
        let mut errors = Vec::new();
        loop {
            let Detached { mut tasks, errors: reaped } = std::mem::take(&mut *lock(&self.detached));
            errors.extend(reaped);
            if tasks.is_empty() {
                return errors;
            }
            while let Some(joined) = tasks.join_next().await {
                errors.extend(failure(joined));
            }
        }
    }
}

fn lock(detached: &Mutex<Detached>) -> MutexGuard<'_, Detached> {
    detached.lock().unwrap_or_else(PoisonError::into_inner)
}
