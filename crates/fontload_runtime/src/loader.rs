//! Public entry point.
//!
//! [`FontLoader::load`] normalizes a request list, starts every top-level
//! load at once and joins them fail-fast: it resolves when all succeed and
//! rejects with the first error to arrive. Loads still in flight at that
//! point keep running in the background so their cache entries are still
//! written; [`FontLoader::settle_detached`] waits for them together with
//! any detached chains.

use crate::monitor::{LoadMetrics, LoadMonitor};
use crate::orchestrator::{LoadFuture, Orchestrator};
use fontload_cache::SessionCache;
use fontload_core::{FontRequest, LoadError, LoadSlot, LoaderConfig, Normalizer, ObserverFactory};
use futures::stream::{FuturesUnordered, StreamExt};
use std::sync::Arc;

/// Loads font request lists with session caching
pub struct FontLoader {
    /// Request normalizer
    normalizer: Normalizer,
    /// Node executor
    orchestrator: Orchestrator,
    /// Configuration
    config: LoaderConfig,
}

impl FontLoader {
    /// Create a loader with the default configuration
    #[must_use]
    pub fn new(factory: Arc<dyn ObserverFactory>, cache: Arc<dyn SessionCache>) -> Self {
        Self::with_config(factory, cache, LoaderConfig::default())
    }

    /// Create a loader with a custom configuration
    #[must_use]
    pub fn with_config(
        factory: Arc<dyn ObserverFactory>,
        cache: Arc<dyn SessionCache>,
        config: LoaderConfig,
    ) -> Self {
        Self {
            normalizer: Normalizer::new(factory, &config),
            orchestrator: Orchestrator::new(cache, &config),
            config,
        }
    }

    /// Loader configuration
    #[must_use]
    pub fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Normalize requests without loading them
    #[must_use]
    pub fn normalize(&self, requests: &[FontRequest]) -> Vec<LoadSlot> {
        self.normalizer.normalize(requests)
    }

    /// Load every request.
    ///
    /// # Errors
    ///
    /// Returns the first error reported by any top-level request. A request
    /// without a name fails with [`LoadError::MissingObserver`].
    pub async fn load(&self, requests: &[FontRequest]) -> Result<(), LoadError> {
        let slots = self.normalizer.normalize(requests);
        if slots.is_empty() {
            return Ok(());
        }
        tracing::debug!(fonts = slots.len(), "starting font loads");

        let mut pending: FuturesUnordered<LoadFuture> = slots
            .into_iter()
            .map(|slot| self.orchestrator.load_slot(slot))
            .collect();

        let failure = loop {
            match pending.next().await {
                Some(Ok(())) => {}
                Some(Err(err)) => break err,
                None => return Ok(()),
            }
        };
        self.release(pending);
        Err(failure)
    }

    /// Hand loads still running after a failure to the background, one
    /// task each so every outcome reaches [`Self::settle_detached`]
    fn release(&self, pending: FuturesUnordered<LoadFuture>) {
        if pending.is_empty() {
            return;
        }
        tracing::debug!(remaining = pending.len(), "font load failed, remaining loads continue in background");

        let dropped = pending
            .into_iter()
            .filter_map(|work| self.orchestrator.detach(work))
            .count();
        if dropped > 0 {
            tracing::warn!(dropped, "no tokio runtime, dropping unsettled font loads");
        }
    }

    /// Wait for detached chains and loads released after a failure.
    ///
    /// Returns the errors they produced.
    pub async fn settle_detached(&self) -> Vec<LoadError> {
        self.orchestrator.settle_detached().await
    }

    /// Number of background loads still running
    #[must_use]
    pub fn pending_detached(&self) -> usize {
        self.orchestrator.pending_detached()
    }

    /// Snapshot of load counters
    #[must_use]
    pub fn metrics(&self) -> LoadMetrics {
        self.orchestrator.monitor().snapshot()
    }

    /// Shared load monitor
    #[must_use]
    pub fn monitor(&self) -> &Arc<LoadMonitor> {
        self.orchestrator.monitor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{Behavior, MockFactory};
    use fontload_cache::MemoryCache;
    use fontload_core::ChainPolicy;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::Notify;

    fn loader(config: LoaderConfig) -> (Arc<MockFactory>, Arc<MemoryCache>, FontLoader) {
        let factory = Arc::new(MockFactory::new());
        let cache = Arc::new(MemoryCache::new());
        let loader = FontLoader::with_config(factory.clone(), cache.clone(), config);
        (factory, cache, loader)
    }

    async fn settle() {
        for _ in 0..16 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test]
    async fn test_load_empty_list() {
        let (factory, cache, loader) = loader(LoaderConfig::default());

        assert!(loader.load(&[]).await.is_ok());
        assert!(factory.created().is_empty());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_load_two_fonts_with_onload() {
        let (factory, cache, loader) = loader(LoaderConfig::default());
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();

        let result = loader
            .load(&[
                FontRequest::new("Roboto").with_timeout(1000),
                FontRequest::new("Lato").with_onload(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                }),
            ])
            .await;

        assert!(result.is_ok());
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(cache.len(), 2);
        assert_eq!(cache.get("loadFont_fontsLoaded__Roboto"), Some(true));
        assert_eq!(cache.get("loadFont_fontsLoaded__Lato"), Some(true));

        let mut calls = factory.calls();
        calls.sort();
        assert_eq!(
            calls,
            vec![
                ("Lato".to_string(), None, 3000),
                ("Roboto".to_string(), None, 1000),
            ]
        );
    }

    #[tokio::test]
    async fn test_cached_fonts_skip_observer() {
        let (factory, cache, loader) = loader(LoaderConfig::default());
        cache.set("loadFont_fontsLoaded__Roboto_700", true);

        loader
            .load(&[FontRequest::new("Roboto").with_setting("weight", 700)])
            .await
            .unwrap();

        assert_eq!(factory.load_count("Roboto"), 0);
        assert_eq!(loader.metrics().cache_hits, 1);
    }

    #[tokio::test]
    async fn test_second_load_hits_cache() {
        let (factory, _, loader) = loader(LoaderConfig::default());
        let requests = [FontRequest::new("Roboto"), FontRequest::new("Lato")];

        loader.load(&requests).await.unwrap();
        loader.load(&requests).await.unwrap();

        assert_eq!(factory.load_count("Roboto"), 1);
        assert_eq!(factory.load_count("Lato"), 1);
        let metrics = loader.metrics();
        assert_eq!(metrics.nodes_started, 4);
        assert_eq!(metrics.cache_hits, 2);
    }

    #[tokio::test]
    async fn test_nameless_request_rejects_without_observer() {
        let (factory, cache, loader) = loader(LoaderConfig::default());

        let result = loader.load(&[FontRequest::new("")]).await;

        assert_eq!(result, Err(LoadError::MissingObserver));
        assert!(factory.created().is_empty());
        assert!(cache.is_empty());
    }

    #[tokio::test]
    async fn test_nameless_request_fails_whole_list() {
        let (_, _, loader) = loader(LoaderConfig::default());

        let result = loader
            .load(&[FontRequest::new("Roboto"), FontRequest::default()])
            .await;

        assert_eq!(result, Err(LoadError::MissingObserver));
    }

    #[tokio::test]
    async fn test_timeout_rejects_and_is_not_cached() {
        let (factory, cache, loader) = loader(LoaderConfig::default());
        factory.set("Roboto", Behavior::Timeout);

        let result = loader
            .load(&[FontRequest::new("Roboto").with_timeout(50), FontRequest::new("Lato")])
            .await;

        assert!(result.unwrap_err().is_timeout());
        assert!(loader.settle_detached().await.is_empty());
        assert_eq!(cache.get("loadFont_fontsLoaded__Roboto"), None);
        assert_eq!(cache.get("loadFont_fontsLoaded__Lato"), Some(true));
    }

    #[tokio::test]
    async fn test_timeout_cached_as_false_when_enabled() {
        let (factory, cache, loader) = loader(LoaderConfig::default().with_cache_failures(true));
        factory.set("Roboto", Behavior::Timeout);

        let result = loader.load(&[FontRequest::new("Roboto")]).await;

        assert!(result.is_err());
        assert_eq!(cache.get("loadFont_fontsLoaded__Roboto"), Some(false));
    }

    #[tokio::test]
    async fn test_fail_fast_leaves_others_running() {
        let (factory, cache, loader) = loader(LoaderConfig::default());
        let gate = Arc::new(Notify::new());
        factory.set("Broken", Behavior::Fail);
        factory.set("Slow", Behavior::Gated(gate.clone()));

        let result = loader
            .load(&[FontRequest::new("Slow"), FontRequest::new("Broken")])
            .await;

        assert!(matches!(result, Err(LoadError::Failed { ref name, .. }) if name == "Broken"));
        assert_eq!(cache.get("loadFont_fontsLoaded__Slow"), None);
        assert_eq!(loader.pending_detached(), 1);

        gate.notify_one();
        assert!(loader.settle_detached().await.is_empty());
        assert_eq!(cache.get("loadFont_fontsLoaded__Slow"), Some(true));
    }

    #[tokio::test]
    async fn test_every_released_failure_reported() {
        let (factory, _, loader) =
            loader(LoaderConfig::default().with_chain_policy(ChainPolicy::Joined));
        let gate_a = Arc::new(Notify::new());
        let gate_b = Arc::new(Notify::new());
        factory.set("SlowA", Behavior::Gated(gate_a.clone()));
        factory.set("SlowB", Behavior::Gated(gate_b.clone()));
        factory.set("BadA", Behavior::Fail);
        factory.set("BadB", Behavior::Fail);
        factory.set("Broken", Behavior::Fail);

        let result = loader
            .load(&[
                FontRequest::new("SlowA").then(FontRequest::new("BadA")),
                FontRequest::new("SlowB").then(FontRequest::new("BadB")),
                FontRequest::new("Broken"),
            ])
            .await;

        assert!(matches!(result, Err(LoadError::Failed { ref name, .. }) if name == "Broken"));
        assert_eq!(loader.pending_detached(), 2);

        gate_a.notify_one();
        gate_b.notify_one();
        let mut failed: Vec<String> = loader
            .settle_detached()
            .await
            .into_iter()
            .map(|err| match err {
                LoadError::Failed { name, .. } => name,
                other => other.to_string(),
            })
            .collect();
        failed.sort();
        assert_eq!(failed, vec!["BadA", "BadB"]);
    }

    #[tokio::test]
    async fn test_released_loads_and_chains_all_reported() {
        let (factory, _, loader) = loader(LoaderConfig::default());
        let gate = Arc::new(Notify::new());
        factory.set("Slow", Behavior::Gated(gate.clone()));
        factory.set("Broken", Behavior::Fail);

        let result = loader
            .load(&[
                FontRequest::new("Slow").then(FontRequest::default()),
                FontRequest::new("Broken"),
                FontRequest::default(),
                FontRequest::new(""),
            ])
            .await;
        assert!(result.is_err());

        gate.notify_one();
        let errors = loader.settle_detached().await;
        // The first rejection is returned by load and not reported again.
        assert_eq!(errors.len(), 3);
        assert!(errors
            .iter()
            .all(|e| matches!(e, LoadError::MissingObserver | LoadError::Failed { .. })));
    }

    #[tokio::test]
    async fn test_pending_drops_after_chains_finish() {
        let (_, _, loader) = loader(LoaderConfig::default());
        let requests = [FontRequest::new("A").then(FontRequest::new("B"))];

        for _ in 0..100 {
            loader.load(&requests).await.unwrap();
        }
        for _ in 0..64 {
            if loader.pending_detached() == 0 {
                break;
            }
            tokio::task::yield_now().await;
        }

        assert_eq!(loader.pending_detached(), 0);
    }

    #[tokio::test]
    async fn test_chain_waits_for_predecessor() {
        let (factory, _, loader) = loader(LoaderConfig::default());
        let gate = Arc::new(Notify::new());
        factory.set("A", Behavior::Gated(gate.clone()));
        let loader = Arc::new(loader);

        let task = tokio::spawn({
            let loader = loader.clone();
            async move {
                loader
                    .load(&[FontRequest::new("A").then(FontRequest::new("B"))])
                    .await
            }
        });

        settle().await;
        assert_eq!(factory.log(), vec!["start:A"]);
        assert_eq!(factory.load_count("B"), 0);

        gate.notify_one();
        task.await.unwrap().unwrap();
        assert!(loader.settle_detached().await.is_empty());
        assert_eq!(factory.log(), vec!["start:A", "end:A", "start:B", "end:B"]);
    }

    #[tokio::test]
    async fn test_detached_chain_not_joined() {
        let (factory, cache, loader) = loader(LoaderConfig::default());
        let gate = Arc::new(Notify::new());
        factory.set("B", Behavior::Gated(gate.clone()));

        loader
            .load(&[FontRequest::new("A").then(FontRequest::new("B"))])
            .await
            .unwrap();
        assert_eq!(cache.get("loadFont_fontsLoaded__B"), None);

        gate.notify_one();
        assert!(loader.settle_detached().await.is_empty());
        assert_eq!(cache.get("loadFont_fontsLoaded__B"), Some(true));
    }

    #[tokio::test]
    async fn test_detached_chain_failure_does_not_reject_load() {
        let (factory, _, loader) = loader(LoaderConfig::default());
        factory.set("B", Behavior::Fail);

        let result = loader
            .load(&[FontRequest::new("A").then(FontRequest::new("B"))])
            .await;

        assert!(result.is_ok());
        let errors = loader.settle_detached().await;
        assert_eq!(errors.len(), 1);
    }

    #[tokio::test]
    async fn test_joined_chain_failure_rejects_load() {
        let (factory, _, loader) =
            loader(LoaderConfig::default().with_chain_policy(ChainPolicy::Joined));
        factory.set("B", Behavior::Fail);

        let result = loader
            .load(&[FontRequest::new("A").then(FontRequest::new("B"))])
            .await;

        assert!(matches!(result, Err(LoadError::Failed { ref name, .. }) if name == "B"));
        assert_eq!(loader.pending_detached(), 0);
    }

    #[tokio::test]
    async fn test_detached_absent_successor_reported() {
        let (_, _, loader) = loader(LoaderConfig::default());

        loader
            .load(&[FontRequest::new("A").then(FontRequest::new(""))])
            .await
            .unwrap();

        assert_eq!(loader.settle_detached().await, vec![LoadError::MissingObserver]);
    }

    #[tokio::test]
    async fn test_top_level_loads_start_together() {
        let (factory, _, loader) = loader(LoaderConfig::default());
        let gate_a = Arc::new(Notify::new());
        let gate_b = Arc::new(Notify::new());
        factory.set("A", Behavior::Gated(gate_a.clone()));
        factory.set("B", Behavior::Gated(gate_b.clone()));
        let loader = Arc::new(loader);

        let task = tokio::spawn({
            let loader = loader.clone();
            async move { loader.load(&[FontRequest::new("A"), FontRequest::new("B")]).await }
        });

        settle().await;
        let mut started = factory.log();
        started.sort();
        assert_eq!(started, vec!["start:A", "start:B"]);

        gate_b.notify_one();
        gate_a.notify_one();
        task.await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_custom_prefix_used_for_cache() {
        let (_, cache, loader) = loader(LoaderConfig::default().with_cache_prefix("fonts:"));

        loader.load(&[FontRequest::new("Fira Code")]).await.unwrap();

        assert_eq!(cache.get("fonts:Fira_Code"), Some(true));
    }

    #[test]
    fn test_normalize_exposed() {
        let (_, _, loader) = loader(LoaderConfig::default());
        let slots = loader.normalize(&[FontRequest::new("A"), FontRequest::default()]);
        assert_eq!(slots.len(), 2);
        assert!(slots[1].is_absent());
    }
}
