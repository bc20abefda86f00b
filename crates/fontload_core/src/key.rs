//! Session cache keys.
//!
//! A key is the prefix, the family name with spaces turned into
//! underscores, then `_<value>` for every setting in iteration order.
//! Keys are compared verbatim; there is no hashing and no reordering of
//! settings.

use crate::settings::Settings;
use serde::{Deserialize, Serialize};

/// Prefix used when the loader config does not override it
pub const DEFAULT_CACHE_PREFIX: &str = "loadFont_fontsLoaded__";

/// Session cache key for one font + settings combination
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CacheKey(String);

impl CacheKey {
    /// Build the key for `name` and optional `settings` under `prefix`
    #[must_use]
    pub fn compute(prefix: &str, name: &str, settings: Option<&Settings>) -> Self {
        let mut key = String::with_capacity(prefix.len() + name.len());
        key.push_str(prefix);
        key.push_str(&name.replace(' ', "_"));

        if let Some(settings) = settings {
            for value in settings.values() {
                key.push('_');
                key.push_str(&value.to_string());
            }
        }

        Self(key)
    }

    /// Build the key under [`DEFAULT_CACHE_PREFIX`]
    #[must_use]
    pub fn with_default_prefix(name: &str, settings: Option<&Settings>) -> Self {
        Self::compute(DEFAULT_CACHE_PREFIX, name, settings)
    }

    /// Wrap an existing key string
    #[must_use]
    pub fn from_raw(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Borrow the key string
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for CacheKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
