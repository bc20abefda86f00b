//! Error types for FONTLOAD.

use crate::timeout::LoadTimeout;

/// Error returned by a single font load or by the joined load of a request list
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LoadError {
    /// The slot has no observation handle (request had no usable name)
    #[error("Observer object not found")]
    MissingObserver,

    /// The observer gave up after the node's timeout
    #[error("Font {name} did not load within {timeout_ms}ms")]
    Timeout {
        /// Font family name
        name: String,
        /// Timeout that elapsed
        timeout_ms: u64,
    },

    /// The observer reported a failure other than a timeout
    #[error("Font {name} failed to load: {reason}")]
    Failed {
        /// Font family name
        name: String,
        /// Observer-provided reason
        reason: String,
    },

    /// A detached load task ended without producing a result
    #[error("Detached load aborted: {reason}")]
    Aborted {
        /// Why the task ended
        reason: String,
    },
}

impl LoadError {
    /// Attach the font name to an observer error
    #[must_use]
    pub fn from_observe(name: &str, timeout: LoadTimeout, err: ObserveError) -> Self {
        match err {
            ObserveError::Timeout => Self::Timeout {
                name: name.to_string(),
                timeout_ms: timeout.as_millis(),
            },
            ObserveError::Failed { reason } => Self::Failed {
                name: name.to_string(),
                reason,
            },
        }
    }

    /// Whether this error came from an elapsed timeout
    #[must_use]
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

/// Error reported by an observation capability
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ObserveError {
    /// The font was not detected before the timeout elapsed
    #[error("Font not detected before timeout")]
    Timeout,

    /// Detection itself failed
    #[error("Detection failed: {reason}")]
    Failed {
        /// Error message
        reason: String,
    },
}

/// Configuration error
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    /// Config source could not be read
    #[error("Failed to read config {path}: {reason}")]
    Io {
        /// Path that failed
        path: String,
        /// IO error message
        reason: String,
    },

    /// Config source is not valid JSON for [`crate::LoaderConfig`]
    #[error("Invalid config: {reason}")]
    Parse {
        /// Parser message
        reason: String,
    },

    /// A field holds a value the loader cannot use
    #[error("Invalid value for {field}: {reason}")]
    Invalid {
        /// Field name
        field: String,
        /// Why it was rejected
        reason: String,
    },
}

impl From<serde_json::Error> for ConfigError {
    fn from(err: serde_json::Error) -> Self {
        Self::Parse {
            reason: err.to_string(),
        }
    }
}
