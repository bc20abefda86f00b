//! Session cache contract.

use serde::{Deserialize, Serialize};

/// Key-value store shared by every load in a session.
///
/// A `true` entry means the font already completed a load attempt and can
/// be skipped. Writers are not coordinated: concurrent writes to one key
/// are last-write-wins.
pub trait SessionCache: Send + Sync {
    /// Read the flag stored for `key`
    fn get(&self, key: &str) -> Option<bool>;

    /// Store a flag for `key`
    fn set(&self, key: &str, value: bool);

    /// Whether `key` holds a truthy entry
    fn is_loaded(&self, key: &str) -> bool {
        self.get(key).unwrap_or(false)
    }
}

/// Cache error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CacheError {
    /// IO error
    #[error("IO error on {path}: {reason}")]
    Io {
        /// File involved
        path: String,
        /// IO error message
        reason: String,
    },
    /// Stored data is not a JSON object of booleans
    #[error("Corrupt cache file {path}: {reason}")]
    Corrupt {
        /// File involved
        path: String,
        /// Parser message
        reason: String,
    },
}

/// Cache access counters
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Number of entries
    pub entries: usize,
    /// Number of reads
    pub read_count: u64,
    /// Number of reads that found a truthy entry
    pub hit_count: u64,
    /// Number of writes
    pub write_count: u64,
}
