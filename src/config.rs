//! Configuration Module
//!
//! Store settings with defaults, a builder, and an optional environment loader.

use std::env;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result};

/// Default interval between sweeper passes.
pub const DEFAULT_SWEEP_INTERVAL: Duration = Duration::from_secs(1);

/// Environment variable holding the sweep interval in milliseconds.
pub const ENV_SWEEP_INTERVAL_MS: &str = "SWEEP_CACHE_INTERVAL_MS";

/// Environment variable holding the expiry policy (`on_read` or `sweep_only`).
pub const ENV_EXPIRY_POLICY: &str = "SWEEP_CACHE_EXPIRY_POLICY";

// == Expiry Policy ==
/// How reads treat entries whose TTL has lapsed but which are not yet swept.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExpiryPolicy {
    /// Expired entries are invisible to reads as soon as their TTL lapses.
    #[default]
    OnRead,
    /// Expired entries stay readable until the sweeper removes them.
    SweepOnly,
}

impl FromStr for ExpiryPolicy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "on_read" => Ok(Self::OnRead),
            "sweep_only" => Ok(Self::SweepOnly),
            other => Err(CacheError::InvalidConfig(format!(
                "unknown expiry policy '{}'",
                other
            ))),
        }
    }
}

impl fmt::Display for ExpiryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnRead => f.write_str("on_read"),
            Self::SweepOnly => f.write_str("sweep_only"),
        }
    }
}

/// Store configuration parameters.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use sweep_cache::{ExpiryPolicy, StoreConfig};
///
/// let config = StoreConfig::default()
///     .with_sweep_interval(Duration::from_millis(250))
///     .with_expiry_policy(ExpiryPolicy::SweepOnly);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Interval between background sweeps
    #[serde(rename = "sweep_interval_ms", with = "duration_ms")]
    pub sweep_interval: Duration,
    /// Read-time handling of lapsed entries
    pub expiry_policy: ExpiryPolicy,
}

impl StoreConfig {
    /// Creates a configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the sweep interval.
    pub fn with_sweep_interval(mut self, interval: Duration) -> Self {
        self.sweep_interval = interval;
        self
    }

    /// Sets the read-time expiry policy.
    pub fn with_expiry_policy(mut self, policy: ExpiryPolicy) -> Self {
        self.expiry_policy = policy;
        self
    }

    /// Checks that the configuration can drive a sweeper.
    pub fn validate(&self) -> Result<()> {
        if self.sweep_interval < Duration::from_millis(1) {
            return Err(CacheError::InvalidConfig(
                "sweep interval must be at least one millisecond".to_string(),
            ));
        }
        Ok(())
    }

    /// Loads a configuration from environment variables.
    ///
    /// # Environment Variables
    /// - `SWEEP_CACHE_INTERVAL_MS` - Sweep interval in milliseconds (default: 1000)
    /// - `SWEEP_CACHE_EXPIRY_POLICY` - `on_read` or `sweep_only` (default: `on_read`)
    ///
    /// Unset variables fall back to defaults; malformed ones are errors.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Builds a configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(raw) = lookup(ENV_SWEEP_INTERVAL_MS) {
            let millis: u64 = raw.trim().parse().map_err(|_| {
                CacheError::InvalidConfig(format!(
                    "{} must be an integer number of milliseconds, got '{}'",
                    ENV_SWEEP_INTERVAL_MS, raw
                ))
            })?;
            config.sweep_interval = Duration::from_millis(millis);
        }

        if let Some(raw) = lookup(ENV_EXPIRY_POLICY) {
            config.expiry_policy = raw.parse()?;
        }

        config.validate()?;
        Ok(config)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            sweep_interval: DEFAULT_SWEEP_INTERVAL,
            expiry_policy: ExpiryPolicy::default(),
        }
    }
}

mod duration_ms {
    use std::time::Duration;

    use serde::ser::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        if value.subsec_nanos() % 1_000_000 != 0 {
            return Err(S::Error::custom(format!(
                "{:?} is not a whole number of milliseconds",
                value
            )));
        }
        let millis = u64::try_from(value.as_millis())
            .map_err(|_| S::Error::custom(format!("{:?} overflows u64 milliseconds", value)))?;
        serializer.serialize_u64(millis)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_millis)
    }
}
