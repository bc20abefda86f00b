//! FONTLOAD System Observer
//!
//! Observation capability that watches the local font database: a font
//! counts as loaded once a face of the requested family and style is
//! installed in the system font directories or in extra directories.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod observer;
pub mod query;

pub use observer::{DEFAULT_POLL_INTERVAL, SystemFontObserver, SystemObserverFactory, SystemObserverOptions};
pub use query::FaceQuery;
