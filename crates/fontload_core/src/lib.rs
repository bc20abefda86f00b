//! FONTLOAD Core Types
//!
//! Font requests, settings, cache keys and the normalized load nodes
//! built from them. Also defines the observer traits that the runtime
//! drives and concrete observers implement.
//!
//! Nothing in this crate performs I/O except [`LoaderConfig::from_file`].

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod error;
pub mod key;
pub mod node;
pub mod observer;
pub mod request;
pub mod settings;
pub mod timeout;

// Re-exports
pub use config::{ChainPolicy, LoaderConfig};
pub use error::{ConfigError, LoadError, ObserveError};
pub use key::{CacheKey, DEFAULT_CACHE_PREFIX};
pub use node::{LoadNode, LoadSlot, Normalizer};
pub use observer::{FontObserver, ObserverFactory};
pub use request::{FontRequest, OnLoad};
pub use settings::{SettingValue, Settings};
pub use timeout::LoadTimeout;
