//! Caller-supplied font requests.

use crate::settings::{SettingValue, Settings};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Callback run once a font has loaded successfully
#[derive(Clone)]
pub struct OnLoad(Arc<dyn Fn() + Send + Sync>);

impl OnLoad {
    /// Wrap a closure
    pub fn new(callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self(Arc::new(callback))
    }

    /// Invoke the callback
    pub fn call(&self) {
        (self.0)()
    }
}

impl std::fmt::Debug for OnLoad {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("OnLoad(..)")
    }
}

/// Declarative description of one font to load.
///
/// Requests deserialize from JSON manifests; `onload` is code and is
/// always attached programmatically.
///
/// ```
/// use fontload_core::FontRequest;
///
/// let request = FontRequest::new("Roboto")
///     .with_setting("weight", 700)
///     .with_timeout(1000)
///     .then(FontRequest::new("Roboto").with_setting("weight", 400));
///
/// assert_eq!(request.next.as_ref().unwrap().name.as_deref(), Some("Roboto"));
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FontRequest {
    /// Font family name. Missing or empty makes the request invalid.
    #[serde(default)]
    pub name: Option<String>,
    /// Style descriptors, in the order they should feed the cache key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub settings: Option<Settings>,
    /// Timeout in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
    /// Sample text passed to the observer
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Callback run after a successful load
    #[serde(skip)]
    pub onload: Option<OnLoad>,
    /// Request loaded after this one succeeds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<FontRequest>>,
}

impl FontRequest {
    /// Create a request for a font family
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Add a style descriptor, keeping insertion order
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: impl Into<SettingValue>) -> Self {
        self.settings
            .get_or_insert_with(Settings::new)
            .insert(key.into(), value.into());
        self
    }

    /// Replace all style descriptors
    #[must_use]
    pub fn with_settings(mut self, settings: Settings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// Set timeout in milliseconds
    #[must_use]
    pub fn with_timeout(mut self, ms: u64) -> Self {
        self.timeout = Some(ms);
        self
    }

    /// Set the sample text handed to the observer
    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    /// Set the success callback
    #[must_use]
    pub fn with_onload(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.onload = Some(OnLoad::new(callback));
        self
    }

    /// Chain a request to load after this one
    #[must_use]
    pub fn then(mut self, next: FontRequest) -> Self {
        self.next = Some(Box::new(next));
        self
    }

    /// Family name, if present and non-empty
    #[must_use]
    pub fn family(&self) -> Option<&str> {
        self.name.as_deref().filter(|name| !name.is_empty())
    }

    /// Number of requests in this chain, including this one
    #[must_use]
    pub fn chain_len(&self) -> usize {
        let mut len = 1;
        let mut cursor = self.next.as_deref();
        while let Some(next) = cursor {
            len += 1;
            cursor = next.next.as_deref();
        }
        len
    }

    /// Parse a JSON array of requests
    ///
    /// # Errors
    ///
    /// Returns error if the input is not a JSON array of requests
    pub fn list_from_json(input: &str) -> Result<Vec<Self>, serde_json::Error> {
        serde_json::from_str(input)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_family_rejects_empty() {
        assert_eq!(FontRequest::new("Lato").family(), Some("Lato"));
        assert_eq!(FontRequest::new("").family(), None);
        assert_eq!(FontRequest::default().family(), None);
    }

    #[test]
    fn test_with_setting_keeps_order() {
        let request = FontRequest::new("Lato")
            .with_setting("style", "italic")
            .with_setting("weight", 300);
        let keys: Vec<&String> = request.settings.as_ref().unwrap().keys().collect();
        assert_eq!(keys, vec!["style", "weight"]);
    }

    #[test]
    fn test_chain_len() {
        let request = FontRequest::new("A").then(FontRequest::new("B").then(FontRequest::new("C")));
        assert_eq!(request.chain_len(), 3);
        assert_eq!(FontRequest::new("A").chain_len(), 1);
    }

    #[test]
    fn test_onload_call() {
        let hits = Arc::new(AtomicUsize::new(0));
        let counter = hits.clone();
        let request = FontRequest::new("Lato").with_onload(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });
        request.onload.as_ref().unwrap().call();
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_list_from_json() {
        let requests = FontRequest::list_from_json(
            r#"[
                {"name": "Roboto", "timeout": 1000},
                {"name": "Lato", "settings": {"weight": 700}, "next": {"name": "Lato", "settings": {"weight": 300}}},
                {"timeout": 50}
            ]"#,
        )
        .unwrap();

        assert_eq!(requests.len(), 3);
        assert_eq!(requests[0].timeout, Some(1000));
        assert_eq!(requests[1].chain_len(), 2);
        assert!(requests[1].onload.is_none());
        assert_eq!(requests[2].family(), None);
    }

    #[test]
    fn test_list_from_json_rejects_object() {
        assert!(FontRequest::list_from_json(r#"{"name": "Roboto"}"#).is_err());
    }
}
