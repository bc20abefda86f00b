//! Load timeouts.
//!
//! Timeouts are whole milliseconds, as requests and manifests express them.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Timeout for a single font load, in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LoadTimeout(u64);

impl LoadTimeout {
    /// Timeout applied when a request does not set one
    pub const DEFAULT: Self = Self(3000);

    /// Create from milliseconds
    #[must_use]
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Resolve a request's optional timeout against a fallback.
    ///
    /// Zero counts as unset.
    #[must_use]
    pub fn resolve(requested: Option<u64>, fallback: Self) -> Self {
        match requested {
            Some(ms) if ms > 0 => Self(ms),
            _ => fallback,
        }
    }

    /// Get raw milliseconds
    #[must_use]
    pub const fn as_millis(&self) -> u64 {
        self.0
    }

    /// Convert to a std duration
    #[must_use]
    pub const fn as_duration(&self) -> Duration {
        Duration::from_millis(self.0)
    }
}

impl Default for LoadTimeout {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl std::fmt::Display for LoadTimeout {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}ms", self.0)
    }
}

impl From<u64> for LoadTimeout {
    fn from(ms: u64) -> Self {
        Self(ms)
    }
}
