//! Cache Module
//!
//! Provides the concurrent in-memory store with per-entry TTL.

mod entry;
mod stats;
mod store;


// Re-export public types
pub use entry::CacheEntry;
pub use stats::CacheStats;
pub use store::Store;
