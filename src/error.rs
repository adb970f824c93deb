//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use chrono::TimeDelta;
use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache operations.
///
/// A missing key is not an error; reads return `Option`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The store has been closed and no longer accepts operations
    #[error("Cache store is closed")]
    Closed,

    /// A negative time-to-live was supplied
    #[error("Negative TTL: {0}")]
    NegativeTtl(TimeDelta),

    /// The store was created outside of a Tokio runtime
    #[error("No Tokio runtime available to run the expiry sweeper")]
    NoRuntime,

    /// Invalid configuration value
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
