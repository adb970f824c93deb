//! Sweep Cache - an embeddable in-memory key-value cache
//!
//! Stores values of one type per cache, each with an optional time-to-live.
//! A background sweeper running on the Tokio runtime removes expired entries
//! on a fixed interval; reads can additionally hide lapsed entries before
//! they are swept (see [`ExpiryPolicy`]).

pub mod cache;
pub mod config;
pub mod error;
pub mod tasks;

pub use cache::{CacheEntry, CacheStats, Store};
pub use config::{ExpiryPolicy, StoreConfig};
pub use error::{CacheError, Result};
