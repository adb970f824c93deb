//! Cache Store Module
//!
//! Main cache engine: a sharded concurrent map of entries with optional
//! expiry, swept periodically by a background task.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::TimeDelta;
use dashmap::DashMap;
use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::stats::StatsRecorder;
use crate::cache::{CacheEntry, CacheStats};
use crate::config::{ExpiryPolicy, StoreConfig};
use crate::error::{CacheError, Result};
use crate::tasks::{spawn_sweeper, Sweep};

// == Store Inner ==
/// State shared by every store handle. The sweeper only holds a weak
/// reference to it; dropping the last handle drops `shutdown_tx`, which
/// ends the sweeper loop.
struct StoreInner<V> {
    entries: DashMap<String, CacheEntry<V>>,
    stats: StatsRecorder,
    config: StoreConfig,
    closed: AtomicBool,
    shutdown_tx: watch::Sender<bool>,
}

impl<V> StoreInner<V> {
    fn is_visible(&self, entry: &CacheEntry<V>) -> bool {
        match self.config.expiry_policy {
            ExpiryPolicy::OnRead => !entry.is_expired(),
            ExpiryPolicy::SweepOnly => true,
        }
    }
}

impl<V: Send + Sync + 'static> Sweep for StoreInner<V> {
    fn sweep_expired(&self) -> usize {
        if self.closed.load(Ordering::Acquire) {
            return 0;
        }

        let mut removed = 0;
        // retain holds each shard's write lock, so the expiry check always
        // sees the entry currently stored under the key.
        self.entries.retain(|_, entry| {
            if entry.is_expired() {
                removed += 1;
                false
            } else {
                true
            }
        });

        self.stats.record_sweep(removed);
        removed
    }
}

// == Store ==
/// Thread-safe in-memory key-value store with optional per-entry TTL.
///
/// Cloning a `Store` yields another handle to the same storage. Each store
/// runs one background sweeper on the Tokio runtime it was created in; the
/// sweeper stops on [`Store::close`] or once every handle has been dropped.
///
/// # Example
/// ```
/// use std::time::Duration;
/// use sweep_cache::Store;
///
/// # #[tokio::main]
/// # async fn main() -> sweep_cache::Result<()> {
/// let store: Store<String> = Store::new()?;
///
/// store.set("user:1", "alice".to_string())?;
/// store.set_with_ttl("session:1", "token".to_string(), Duration::from_secs(30))?;
///
/// assert_eq!(store.get("user:1"), Some("alice".to_string()));
/// store.delete("user:1")?;
/// assert_eq!(store.get("user:1"), None);
///
/// store.close()?;
/// # Ok(())
/// # }
/// ```
pub struct Store<V> {
    inner: Arc<StoreInner<V>>,
    sweeper: Arc<JoinHandle<()>>,
}

impl<V> Clone for Store<V> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
            sweeper: Arc::clone(&self.sweeper),
        }
    }
}

impl<V> std::fmt::Debug for Store<V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("entries", &self.inner.entries.len())
            .field("config", &self.inner.config)
            .field("closed", &self.inner.closed.load(Ordering::Acquire))
            .finish()
    }
}

impl<V> Store<V>
where
    V: Clone + Send + Sync + 'static,
{
    // == Constructors ==
    /// Creates a store with the default configuration (1 second sweeps,
    /// expiry enforced on read).
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new() -> Result<Self> {
        Self::with_config(StoreConfig::default())
    }

    /// Creates a store with a custom configuration and starts its sweeper.
    pub fn with_config(config: StoreConfig) -> Result<Self> {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| CacheError::NoRuntime)?;

        let (shutdown_tx, shutdown_rx) = watch::channel(false);
        let interval = config.sweep_interval;

        let inner = Arc::new(StoreInner {
            entries: DashMap::new(),
            stats: StatsRecorder::new(),
            config,
            closed: AtomicBool::new(false),
            shutdown_tx,
        });

        let sweeper = spawn_sweeper(&runtime, Arc::downgrade(&inner), interval, shutdown_rx);

        Ok(Self {
            inner,
            sweeper: Arc::new(sweeper),
        })
    }

    // == Set ==
    /// Stores a value that never expires, replacing any previous entry and
    /// clearing its expiry.
    pub fn set(&self, key: impl Into<String>, value: V) -> Result<()> {
        self.insert(key.into(), CacheEntry::new(value))
    }

    /// Stores a value that expires `ttl` from now, replacing any previous
    /// entry.
    ///
    /// A zero TTL stores an entry that is already expired: hidden from reads
    /// under [`ExpiryPolicy::OnRead`] and removed by the next sweep.
    pub fn set_with_ttl(&self, key: impl Into<String>, value: V, ttl: Duration) -> Result<()> {
        self.insert(key.into(), CacheEntry::with_ttl(value, ttl))
    }

    /// Like [`Store::set_with_ttl`] for a signed chrono span.
    ///
    /// Negative spans are rejected with [`CacheError::NegativeTtl`].
    pub fn set_with_signed_ttl(
        &self,
        key: impl Into<String>,
        value: V,
        ttl: TimeDelta,
    ) -> Result<()> {
        let ttl_std = ttl.to_std().map_err(|_| CacheError::NegativeTtl(ttl))?;
        self.set_with_ttl(key, value, ttl_std)
    }

    fn insert(&self, key: String, entry: CacheEntry<V>) -> Result<()> {
        self.ensure_open("set")?;
        self.inner.entries.insert(key.clone(), entry);

        // A close that cleared the map between the check and the insert must
        // not leave this entry behind.
        if self.is_closed() {
            self.inner.entries.remove(&key);
            return Err(CacheError::Closed);
        }
        Ok(())
    }

    // == Get ==
    /// Returns a clone of the value stored under `key`.
    ///
    /// Returns `None` if the key is absent, if the store is closed, or if the
    /// entry has expired and the policy is [`ExpiryPolicy::OnRead`]. Never
    /// removes anything.
    pub fn get(&self, key: &str) -> Option<V> {
        if self.is_closed() {
            return None;
        }

        let value = self
            .inner
            .entries
            .get(key)
            .filter(|entry| self.inner.is_visible(entry))
            .map(|entry| entry.value.clone());

        if value.is_some() {
            self.inner.stats.record_hit();
        } else {
            self.inner.stats.record_miss();
        }
        value
    }

    /// Returns true if `get` would currently find a value for `key`.
    ///
    /// Does not count towards hit/miss statistics.
    pub fn contains_key(&self, key: &str) -> bool {
        !self.is_closed()
            && self
                .inner
                .entries
                .get(key)
                .is_some_and(|entry| self.inner.is_visible(&entry))
    }

    /// Returns the remaining lifetime of a visible entry that has an expiry.
    ///
    /// `None` for absent keys and for entries that never expire.
    pub fn ttl(&self, key: &str) -> Option<Duration> {
        if self.is_closed() {
            return None;
        }
        let entry = self.inner.entries.get(key)?;
        if !self.inner.is_visible(&entry) {
            return None;
        }
        entry.ttl_remaining()
    }

    // == Delete ==
    /// Removes the entry for `key`. Deleting an absent key is a no-op.
    pub fn delete(&self, key: &str) -> Result<()> {
        self.ensure_open("delete")?;
        self.inner.entries.remove(key);
        Ok(())
    }

    // == Sweep ==
    /// Runs one sweep pass immediately, returning how many expired entries
    /// were removed.
    pub fn sweep_expired(&self) -> usize {
        let removed = self.inner.sweep_expired();
        debug!(removed, "Manual expiry sweep finished");
        removed
    }

    // == Close ==
    /// Stops the sweeper and drops every entry.
    ///
    /// Succeeds once. Afterwards writes and further `close` calls return
    /// [`CacheError::Closed`] and reads find nothing.
    pub fn close(&self) -> Result<()> {
        if self
            .inner
            .closed
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            return Err(CacheError::Closed);
        }

        let _ = self.inner.shutdown_tx.send(true);
        self.inner.entries.clear();
        info!("Cache store closed");
        Ok(())
    }

    /// Returns true once [`Store::close`] has been called.
    pub fn is_closed(&self) -> bool {
        self.inner.closed.load(Ordering::Acquire)
    }

    /// Returns true while the background sweeper task is alive.
    pub fn is_sweeper_running(&self) -> bool {
        !self.sweeper.is_finished()
    }

    fn ensure_open(&self, op: &str) -> Result<()> {
        if self.is_closed() {
            warn!(op, "Operation on closed cache store");
            return Err(CacheError::Closed);
        }
        Ok(())
    }

    // == Introspection ==
    /// Returns the number of stored entries, including expired entries the
    /// sweeper has not removed yet.
    pub fn len(&self) -> usize {
        if self.is_closed() {
            0
        } else {
            self.inner.entries.len()
        }
    }

    /// Returns true if the store holds no entries.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        self.inner.stats.snapshot(self.len())
    }

    /// Returns the configuration this store was created with.
    pub fn config(&self) -> &StoreConfig {
        &self.inner.config
    }
}
