//! Load monitor for metrics.
//!
//! Counters are atomics so detached chain tasks can record into the same
//! monitor as the caller's load.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of load counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoadMetrics {
    /// Nodes whose load began (absent slots excluded)
    pub nodes_started: u64,
    /// Nodes resolved from the session cache
    pub cache_hits: u64,
    /// Observer load calls issued
    pub observations: u64,
    /// Nodes that loaded successfully
    pub nodes_completed: u64,
    /// Nodes whose observer rejected
    pub nodes_failed: u64,
    /// Absent slots rejected with a missing observer
    pub missing_observers: u64,
    /// Chained loads started
    pub chains_started: u64,
}

impl LoadMetrics {
    /// Get success rate (0.0 - 1.0)
    #[must_use]
    pub fn success_rate(&self) -> f64 {
        let settled = self.nodes_completed + self.nodes_failed;
        if settled == 0 {
            return 1.0;
        }
        self.nodes_completed as f64 / settled as f64
    }

    /// Get failure rate (0.0 - 1.0)
    #[must_use]
    pub fn failure_rate(&self) -> f64 {
        let settled = self.nodes_completed + self.nodes_failed;
        if settled == 0 {
            return 0.0;
        }
        self.nodes_failed as f64 / settled as f64
    }

    /// Get the share of started nodes served from cache (0.0 - 1.0)
    #[must_use]
    pub fn cache_hit_rate(&self) -> f64 {
        if self.nodes_started == 0 {
            return 0.0;
        }
        self.cache_hits as f64 / self.nodes_started as f64
    }
}

/// Shared load counters
#[derive(Debug, Default)]
pub struct LoadMonitor {
    nodes_started: AtomicU64,
    cache_hits: AtomicU64,
    observations: AtomicU64,
    nodes_completed: AtomicU64,
    nodes_failed: AtomicU64,
    missing_observers: AtomicU64,
    chains_started: AtomicU64,
}

impl LoadMonitor {
    /// Create a new monitor
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a node start
    pub fn record_start(&self) {
        self.nodes_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a cache hit
    pub fn record_cache_hit(&self) {
        self.cache_hits.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an observer call
    pub fn record_observation(&self) {
        self.observations.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a successful node
    pub fn record_completion(&self) {
        self.nodes_completed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a failed node
    pub fn record_failure(&self) {
        self.nodes_failed.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an absent slot
    pub fn record_missing(&self) {
        self.missing_observers.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a chained load
    pub fn record_chain(&self) {
        self.chains_started.fetch_add(1, Ordering::Relaxed);
    }

    /// Take a snapshot of every counter
    #[must_use]
    pub fn snapshot(&self) -> LoadMetrics {
        LoadMetrics {
            nodes_started: self.nodes_started.load(Ordering::Relaxed),
            cache_hits: self.cache_hits.load(Ordering::Relaxed),
            observations: self.observations.load(Ordering::Relaxed),
            nodes_completed: self.nodes_completed.load(Ordering::Relaxed),
            nodes_failed: self.nodes_failed.load(Ordering::Relaxed),
            missing_observers: self.missing_observers.load(Ordering::Relaxed),
            chains_started: self.chains_started.load(Ordering::Relaxed),
        }
    }

    /// Reset every counter
    pub fn reset(&self) {
        for counter in [
            &self.nodes_started,
            &self.cache_hits,
            &self.observations,
            &self.nodes_completed,
            &self.nodes_failed,
            &self.missing_observers,
            &self.chains_started,
        ] {
            counter.store(0, Ordering::Relaxed);
        }
    }
}
