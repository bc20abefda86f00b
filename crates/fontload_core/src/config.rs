//! Loader configuration.

use crate::error::ConfigError;
use crate::key::DEFAULT_CACHE_PREFIX;
use crate::timeout::LoadTimeout;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// How a chained (`next`) load relates to its parent's result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChainPolicy {
    /// Chained loads run as their own task; the parent resolves without them
    #[default]
    Detached,
    /// The parent resolves only once its whole chain has loaded
    Joined,
}

/// Loader configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Prefix for every session cache key
    pub cache_prefix: String,
    /// Timeout for requests that do not set one (milliseconds)
    pub default_timeout_ms: u64,
    /// Record failed loads as explicit `false` cache entries
    pub cache_failures: bool,
    /// Relationship between a node and its chained successor
    pub chain_policy: ChainPolicy,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            cache_prefix: DEFAULT_CACHE_PREFIX.to_string(),
            default_timeout_ms: LoadTimeout::DEFAULT.as_millis(),
            cache_failures: false,
            chain_policy: ChainPolicy::Detached,
        }
    }
}

impl LoaderConfig {
    /// Parse from JSON. Missing fields take their defaults.
    ///
    /// # Errors
    ///
    /// Returns error if the JSON is malformed or a value is unusable
    pub fn from_json(input: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Read and parse a JSON config file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or parsed
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let input = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_json(&input)
    }

    /// Check that every field is usable
    ///
    /// # Errors
    ///
    /// Returns error naming the first invalid field
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_timeout_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "default_timeout_ms".to_string(),
                reason: "must be positive".to_string(),
            });
        }
        Ok(())
    }

    /// Default timeout as a [`LoadTimeout`]; zero falls back to 3000 ms
    #[must_use]
    pub fn default_timeout(&self) -> LoadTimeout {
        LoadTimeout::resolve(Some(self.default_timeout_ms), LoadTimeout::DEFAULT)
    }

    /// Set the cache key prefix
    #[must_use]
    pub fn with_cache_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.cache_prefix = prefix.into();
        self
    }

    /// Set the default timeout
    #[must_use]
    pub fn with_default_timeout(mut self, ms: u64) -> Self {
        self.default_timeout_ms = ms;
        self
    }

    /// Enable/disable negative cache entries for failed loads
    #[must_use]
    pub fn with_cache_failures(mut self, cache_failures: bool) -> Self {
        self.cache_failures = cache_failures;
        self
    }

    /// Set the chain policy
    #[must_use]
    pub fn with_chain_policy(mut self, policy: ChainPolicy) -> Self {
        self.chain_policy = policy;
        self
    }
}
