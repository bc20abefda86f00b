//! Font database observer.
//!
//! Each load rescans the configured font sources on a blocking worker and
//! retries until the family is found or the timeout elapses.

use crate::query::FaceQuery;
use async_trait::async_trait;
use fontdb::{Database, Family, Query};
use fontload_core::{FontObserver, ObserveError, ObserverFactory, Settings};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// Delay between scans unless configured otherwise
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Where to look for fonts and how often
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemObserverOptions {
    /// Scan the platform's system font directories
    pub include_system_fonts: bool,
    /// Extra directories to scan
    pub font_dirs: Vec<PathBuf>,
    /// Delay between scans
    pub poll_interval: Duration,
}

impl Default for SystemObserverOptions {
    fn default() -> Self {
        Self {
            include_system_fonts: true,
            font_dirs: Vec::new(),
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

impl SystemObserverOptions {
    /// Create options with system fonts enabled
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable/disable system font directories
    #[must_use]
    pub fn with_system_fonts(mut self, include: bool) -> Self {
        self.include_system_fonts = include;
        self
    }

    /// Add an extra font directory
    #[must_use]
    pub fn with_font_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.font_dirs.push(dir.into());
        self
    }

    /// Set the delay between scans
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Build a fresh database from the configured sources
    fn scan(&self) -> Database {
        let mut db = Database::new();
        if self.include_system_fonts {
            db.load_system_fonts();
        }
        for dir in &self.font_dirs {
            db.load_fonts_dir(dir);
        }
        db
    }
}

/// Observer for one family + face query.
///
/// Sample text is not checked against glyph coverage.
#[derive(Debug, Clone)]
pub struct SystemFontObserver {
    family: String,
    query: FaceQuery,
    options: Arc<SystemObserverOptions>,
}

impl SystemFontObserver {
    /// Create an observer
    #[must_use]
    pub fn new(family: impl Into<String>, query: FaceQuery, options: Arc<SystemObserverOptions>) -> Self {
        Self {
            family: family.into(),
            query,
            options,
        }
    }

    /// Scan once and report whether a matching face is installed
    #[must_use]
    pub fn probe(&self) -> bool {
        let db = self.options.scan();
        let families = [Family::Name(&self.family)];
        let query = Query {
            families: &families,
            weight: self.query.weight,
            stretch: self.query.stretch,
            style: self.query.style,
        };

        let Some(id) = db.query(&query) else {
            return false;
        };
        if !self.query.strict_style {
            return true;
        }
        db.face(id).is_some_and(|face| face.style == self.query.style)
    }

    /// Scan until a face is found
    async fn poll(&self) -> Result<(), ObserveError> {
        loop {
            let observer = self.clone();
            let found = tokio::task::spawn_blocking(move || observer.probe())
                .await
                .map_err(|e| ObserveError::Failed {
                    reason: format!("font scan aborted: {}", e),
                })?;

            if found {
                tracing::debug!(family = %self.family, "font face found");
                return Ok(());
            }
            tracing::trace!(family = %self.family, "font face not installed yet");
            tokio::time::sleep(self.options.poll_interval).await;
        }
    }
}

#[async_trait]
impl FontObserver for SystemFontObserver {
    async fn load(&self, _scope: Option<&str>, timeout: Duration) -> Result<(), ObserveError> {
        tokio::time::timeout(timeout, self.poll())
            .await
            .unwrap_or(Err(ObserveError::Timeout))
    }
}

/// Creates [`SystemFontObserver`]s sharing one set of options
#[derive(Debug, Clone, Default)]
pub struct SystemObserverFactory {
    options: Arc<SystemObserverOptions>,
}

impl SystemObserverFactory {
    /// Create a factory
    #[must_use]
    pub fn new(options: SystemObserverOptions) -> Self {
        Self {
            options: Arc::new(options),
        }
    }

    /// Shared options
    #[must_use]
    pub fn options(&self) -> &SystemObserverOptions {
        &self.options
    }
}

impl ObserverFactory for SystemObserverFactory {
    fn create(&self, name: &str, settings: Option<&Settings>) -> Arc<dyn FontObserver> {
        Arc::new(SystemFontObserver::new(
            name,
            FaceQuery::from_settings(settings),
            self.options.clone(),
        ))
    }
}
