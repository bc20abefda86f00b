//! FONTLOAD Session Cache
//!
//! Key-value stores recording which fonts already completed a load
//! attempt. The loader only needs [`SessionCache`]; the in-memory and
//! file-backed stores here are the two implementations shipped with it.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod file;
pub mod memory;
pub mod session;

pub use file::FileCache;
pub use memory::MemoryCache;
pub use session::{CacheError, CacheStats, SessionCache};
