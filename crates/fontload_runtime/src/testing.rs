//! Scriptable observers for runtime tests.

use async_trait::async_trait;
use fontload_core::{FontObserver, ObserveError, ObserverFactory, Settings};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// What a mock observer does when loaded
#[derive(Clone)]
pub(crate) enum Behavior {
    /// Resolve immediately
    Ready,
    /// Reject with a detection failure
    Fail,
    /// Reject with a timeout
    Timeout,
    /// Resolve once the gate is notified
    Gated(Arc<Notify>),
}

/// Shared record of what observers were asked to do
#[derive(Default)]
struct Journal {
    log: Vec<String>,
    calls: Vec<(String, Option<String>, u64)>,
    created: Vec<String>,
}

/// Factory handing out observers scripted per font name
pub(crate) struct MockFactory {
    behaviors: Mutex<HashMap<String, Behavior>>,
    journal: Arc<Mutex<Journal>>,
}

impl MockFactory {
    pub(crate) fn new() -> Self {
        Self {
            behaviors: Mutex::new(HashMap::new()),
            journal: Arc::new(Mutex::new(Journal::default())),
        }
    }

    /// Script the behavior for a font; unscripted fonts are `Ready`
    pub(crate) fn set(&self, name: &str, behavior: Behavior) {
        self.behaviors.lock().unwrap().insert(name.to_string(), behavior);
    }

    /// `start:<name>` / `end:<name>` entries in the order they happened
    pub(crate) fn log(&self) -> Vec<String> {
        self.journal.lock().unwrap().log.clone()
    }

    /// `(name, scope, timeout_ms)` for every observer load call
    pub(crate) fn calls(&self) -> Vec<(String, Option<String>, u64)> {
        self.journal.lock().unwrap().calls.clone()
    }

    /// Names observers were created for
    pub(crate) fn created(&self) -> Vec<String> {
        self.journal.lock().unwrap().created.clone()
    }

    /// Number of load calls for `name`
    pub(crate) fn load_count(&self, name: &str) -> usize {
        self.journal
            .lock()
            .unwrap()
            .calls
            .iter()
            .filter(|(n, _, _)| n == name)
            .count()
    }
}

impl ObserverFactory for MockFactory {
    fn create(&self, name: &str, _settings: Option<&Settings>) -> Arc<dyn FontObserver> {
        self.journal.lock().unwrap().created.push(name.to_string());
        let behavior = self
            .behaviors
            .lock()
            .unwrap()
            .get(name)
            .cloned()
            .unwrap_or(Behavior::Ready);

        Arc::new(MockObserver {
            name: name.to_string(),
            behavior,
            journal: self.journal.clone(),
        })
    }
}

struct MockObserver {
    name: String,
    behavior: Behavior,
    journal: Arc<Mutex<Journal>>,
}

#[async_trait]
impl FontObserver for MockObserver {
    async fn load(&self, scope: Option<&str>, timeout: Duration) -> Result<(), ObserveError> {
        {
            let mut journal = self.journal.lock().unwrap();
            journal.log.push(format!("start:{}", self.name));
            journal.calls.push((
                self.name.clone(),
                scope.map(str::to_string),
                timeout.as_millis() as u64,
            ));
        }

        let result = match &self.behavior {
            Behavior::Ready => Ok(()),
            Behavior::Fail => Err(ObserveError::Failed {
                reason: "scripted failure".to_string(),
            }),
            Behavior::Timeout => Err(ObserveError::Timeout),
            Behavior::Gated(gate) => {
                gate.notified().await;
                Ok(())
            }
        };

        self.journal.lock().unwrap().log.push(format!("end:{}", self.name));
        result
    }
}
