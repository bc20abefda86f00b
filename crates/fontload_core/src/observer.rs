//! Observation capability.
//!
//! An observer detects when a font becomes usable. The loader never
//! fetches or parses fonts itself; it only asks an observer to wait for
//! one, bounded by the node's timeout.

use crate::error::ObserveError;
use crate::settings::Settings;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Handle that waits for one font (family + settings) to become available
#[async_trait]
pub trait FontObserver: Send + Sync {
    /// Wait for the font.
    ///
    /// `scope` is optional sample text the font must be able to render.
    ///
    /// # Errors
    ///
    /// Returns [`ObserveError::Timeout`] if the font is not detected within
    /// `timeout`, or [`ObserveError::Failed`] if detection itself fails
    async fn load(&self, scope: Option<&str>, timeout: Duration) -> Result<(), ObserveError>;
}

/// Creates observers for font families
pub trait ObserverFactory: Send + Sync {
    /// Create an observer for `name` with optional style settings
    fn create(&self, name: &str, settings: Option<&Settings>) -> Arc<dyn FontObserver>;
}

impl<F> ObserverFactory for F
where
    F: Fn(&str, Option<&Settings>) -> Arc<dyn FontObserver> + Send + Sync,
{
    fn create(&self, name: &str, settings: Option<&Settings>) -> Arc<dyn FontObserver> {
        self(name, settings)
    }
}
