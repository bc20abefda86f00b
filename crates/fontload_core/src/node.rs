//! Load nodes and request normalization.
//!
//! The normalizer turns each [`FontRequest`] into a [`LoadSlot`]: either a
//! ready-to-run [`LoadNode`] or [`LoadSlot::Absent`] for a request with no
//! usable name. Output has the same length and order as the input. Absent
//! slots are kept so the runtime can fail them instead of dropping them.

use crate::config::LoaderConfig;
use crate::error::LoadError;
use crate::key::CacheKey;
use crate::observer::{FontObserver, ObserverFactory};
use crate::request::{FontRequest, OnLoad};
use crate::timeout::LoadTimeout;
use std::sync::Arc;

/// Normalized request, ready for the orchestrator
#[derive(Clone)]
pub struct LoadNode {
    /// Font family name
    pub name: String,
    /// Observation handle for this family + settings
    pub observer: Arc<dyn FontObserver>,
    /// Session cache key
    pub cache_key: CacheKey,
    /// Load timeout
    pub timeout: LoadTimeout,
    /// Sample text for the observer
    pub text: Option<String>,
    /// Success callback
    pub onload: Option<OnLoad>,
    /// Successor, loaded after this node succeeds
    pub next: Option<Box<LoadSlot>>,
}

impl std::fmt::Debug for LoadNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoadNode")
            .field("name", &self.name)
            .field("cache_key", &self.cache_key)
            .field("timeout", &self.timeout)
            .field("text", &self.text)
            .field("onload", &self.onload.is_some())
            .field("next", &self.next)
            .finish_non_exhaustive()
    }
}

/// A normalized request position
#[derive(Debug, Clone)]
pub enum LoadSlot {
    /// Valid request
    Node(LoadNode),
    /// Request without a usable name
    Absent,
}

impl LoadSlot {
    /// Take the node out of the slot
    ///
    /// # Errors
    ///
    /// Returns [`LoadError::MissingObserver`] for an absent slot
    pub fn into_node(self) -> Result<LoadNode, LoadError> {
        match self {
            Self::Node(node) => Ok(node),
            Self::Absent => Err(LoadError::MissingObserver),
        }
    }

    /// Borrow the node, if any
    #[must_use]
    pub fn as_node(&self) -> Option<&LoadNode> {
        match self {
            Self::Node(node) => Some(node),
            Self::Absent => None,
        }
    }

    /// Whether the slot is absent
    #[must_use]
    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// Builds load nodes from requests
pub struct Normalizer {
    /// Source of observation handles
    factory: Arc<dyn ObserverFactory>,
    /// Cache key prefix
    prefix: String,
    /// Timeout for requests without one
    default_timeout: LoadTimeout,
}

impl Normalizer {
    /// Create a normalizer using the config's prefix and default timeout
    #[must_use]
    pub fn new(factory: Arc<dyn ObserverFactory>, config: &LoaderConfig) -> Self {
        Self {
            factory,
            prefix: config.cache_prefix.clone(),
            default_timeout: config.default_timeout(),
        }
    }

    /// Normalize a request list, one slot per request
    #[must_use]
    pub fn normalize(&self, requests: &[FontRequest]) -> Vec<LoadSlot> {
        requests.iter().map(|request| self.normalize_one(request)).collect()
    }

    /// Normalize a single request and its chain
    #[must_use]
    pub fn normalize_one(&self, request: &FontRequest) -> LoadSlot {
        let Some(name) = request.family() else {
            return LoadSlot::Absent;
        };
        let settings = request.settings.as_ref();

        LoadSlot::Node(LoadNode {
            name: name.to_string(),
            observer: self.factory.create(name, settings),
            cache_key: self.cache_key(name, request),
            timeout: LoadTimeout::resolve(request.timeout, self.default_timeout),
            text: request.text.clone(),
            onload: request.onload.clone(),
            next: request
                .next
                .as_deref()
                .map(|next| Box::new(self.normalize_one(next))),
        })
    }

    /// Cache key this normalizer would give `request`
    #[must_use]
    pub fn cache_key(&self, name: &str, request: &FontRequest) -> CacheKey {
        CacheKey::compute(&self.prefix, name, request.settings.as_ref())
    }
}
