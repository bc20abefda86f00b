//! File-backed session cache.
//!
//! The file is a JSON object mapping cache keys to booleans. It is loaded
//! on open and rewritten after every write. Before rewriting, entries that
//! other writers added to the file since are merged in, so caches sharing
//! a file do not drop each other's entries. Reads only see the file as of
//! the last open or write, and writes are not locked across processes.

use crate::session::{CacheError, SessionCache};
use indexmap::IndexMap;
use std::path::{Path, PathBuf};
use std::sync::{PoisonError, RwLock};

/// Persistent cache stored as a JSON file
#[derive(Debug)]
pub struct FileCache {
    /// Backing file
    path: PathBuf,
    /// Flags by key, in insertion order
    entries: RwLock<IndexMap<String, bool>>,
}

impl FileCache {
    /// Open the cache at `path`. A missing file is an empty cache.
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CacheError> {
        let path = path.into();
        let entries = read_entries(&path)?;

        tracing::debug!(path = %path.display(), entries = entries.len(), "opened session cache");

        Ok(Self {
            path,
            entries: RwLock::new(entries),
        })
    }

    /// Backing file path
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Snapshot of all entries in insertion order
    #[must_use]
    pub fn entries(&self) -> Vec<(String, bool)> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    /// Store a flag and persist the file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be written. The in-memory entry is
    /// updated either way.
    pub fn try_set(&self, key: &str, value: bool) -> Result<(), CacheError> {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        self.merge_from_disk(&mut entries);
        entries.insert(key.to_string(), value);
        self.persist(&entries)
    }

    /// Pull in entries written to the file by other caches. A `true` on
    /// disk wins over a local `false`.
    fn merge_from_disk(&self, entries: &mut IndexMap<String, bool>) {
        match read_entries(&self.path) {
            Ok(disk) => {
                for (key, loaded) in disk {
                    *entries.entry(key).or_insert(loaded) |= loaded;
                }
            }
            Err(err) => {
                tracing::debug!(error = %err, "session cache file unreadable, overwriting");
            }
        }
    }

    /// Write entries to disk
    fn persist(&self, entries: &IndexMap<String, bool>) -> Result<(), CacheError> {
        let io_err = |e: std::io::Error| CacheError::Io {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }

        let data = serde_json::to_vec_pretty(entries).map_err(|e| CacheError::Corrupt {
            path: self.path.display().to_string(),
            reason: e.to_string(),
        })?;
        std::fs::write(&self.path, data).map_err(io_err)
    }
}

/// Read the entries stored at `path`; missing or blank files are empty
fn read_entries(path: &Path) -> Result<IndexMap<String, bool>, CacheError> {
    match std::fs::read(path) {
        Ok(bytes) if bytes.iter().all(u8::is_ascii_whitespace) => Ok(IndexMap::new()),
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| CacheError::Corrupt {
            path: path.display().to_string(),
            reason: e.to_string(),
        }),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(IndexMap::new()),
        Err(e) => Err(CacheError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        }),
    }
}

impl SessionCache for FileCache {
    fn get(&self, key: &str) -> Option<bool> {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .copied()
    }

    fn set(&self, key: &str, value: bool) {
        // Worst case of a lost write is a redundant reload next session.
        if let Err(err) = self.try_set(key, value) {
            tracing::warn!(key, error = %err, "failed to persist session cache entry");
        }
    }
}
