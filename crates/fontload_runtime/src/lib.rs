//! FONTLOAD Runtime
//!
//! Runs normalized load nodes against an observation capability and a
//! session cache, chains sequential loads, and joins top-level results
//! into a single fail-fast outcome.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod loader;
pub mod monitor;
pub mod orchestrator;

#[cfg(test)]
mod testing;

pub use loader::FontLoader;
pub use monitor::{LoadMetrics, LoadMonitor};
pub use orchestrator::{LoadFuture, Orchestrator};
