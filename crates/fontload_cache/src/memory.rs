//! In-memory session cache.

use crate::session::{CacheStats, SessionCache};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Process-lifetime cache
#[derive(Debug, Default)]
pub struct MemoryCache {
    /// Flags by key
    entries: RwLock<HashMap<String, bool>>,
    /// Access counters
    stats: RwLock<CacheStats>,
}

impl MemoryCache {
    /// Create an empty cache
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a cache pre-populated with entries
    #[must_use]
    pub fn with_entries<I, K>(entries: I) -> Self
    where
        I: IntoIterator<Item = (K, bool)>,
        K: Into<String>,
    {
        let entries: HashMap<String, bool> = entries.into_iter().map(|(k, v)| (k.into(), v)).collect();
        let stats = CacheStats {
            entries: entries.len(),
            ..CacheStats::default()
        };
        Self {
            entries: RwLock::new(entries),
            stats: RwLock::new(stats),
        }
    }

    /// Whether any entry exists for `key`, truthy or not
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(key)
    }

    /// Number of entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    /// Whether the cache is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Get access counters
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl SessionCache for MemoryCache {
    fn get(&self, key: &str) -> Option<bool> {
        let value = self
            .entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied();

        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
        stats.read_count += 1;
        if value == Some(true) {
            stats.hit_count += 1;
        }
        value
    }

    fn set(&self, key: &str, value: bool) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(key.to_string(), value);

        let mut stats = self.stats.write().unwrap_or_else(PoisonError::into_inner);
        stats.entries = entries.len();
        stats.write_count += 1;
    }
}
