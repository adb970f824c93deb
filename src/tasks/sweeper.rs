//! Expiry Sweeper Task
//!
//! Background task that periodically removes expired cache entries.

use std::sync::Weak;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, info};

/// Something the sweeper can ask to drop its expired entries.
pub trait Sweep: Send + Sync + 'static {
    /// Runs one full pass and returns how many entries were removed.
    fn sweep_expired(&self) -> usize;
}

/// Spawns a task that calls [`Sweep::sweep_expired`] every `interval`.
///
/// The first pass happens one full interval after spawning. The task stops
/// when `shutdown` carries `true`, when its sender is dropped, or when
/// `target` can no longer be upgraded. It never keeps `target` alive between
/// passes.
///
/// # Example
/// ```ignore
/// let (shutdown_tx, shutdown_rx) = watch::channel(false);
/// let handle = spawn_sweeper(&Handle::current(), Arc::downgrade(&inner), interval, shutdown_rx);
/// // Later:
/// shutdown_tx.send(true)?;
/// ```
pub fn spawn_sweeper<T: Sweep>(
    runtime: &Handle,
    target: Weak<T>,
    interval: Duration,
    mut shutdown: watch::Receiver<bool>,
) -> JoinHandle<()> {
    runtime.spawn(async move {
        info!("Starting expiry sweeper with interval of {:?}", interval);

        let mut ticker = tokio::time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // The first tick completes immediately
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    let Some(strong) = target.upgrade() else {
                        debug!("Sweep target dropped");
                        break;
                    };
                    let removed = strong.sweep_expired();
                    drop(strong);

                    if removed > 0 {
                        debug!(removed, "Expiry sweep removed expired entries");
                    } else {
                        debug!("Expiry sweep found no expired entries");
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
            }
        }

        info!("Expiry sweeper stopped");
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingTarget {
        passes: AtomicUsize,
    }

    impl Sweep for CountingTarget {
        fn sweep_expired(&self) -> usize {
            self.passes.fetch_add(1, Ordering::SeqCst);
            0
        }
    }

    #[tokio::test]
    async fn test_sweeper_runs_periodically() {
        let target = Arc::new(CountingTarget::default());
        let (_tx, rx) = watch::channel(false);

        let handle = spawn_sweeper(
            &Handle::current(),
            Arc::downgrade(&target),
            Duration::from_millis(20),
            rx,
        );

        tokio::time::sleep(Duration::from_millis(150)).await;
        assert!(target.passes.load(Ordering::SeqCst) >= 2);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweeper_waits_one_interval_before_first_pass() {
        let target = Arc::new(CountingTarget::default());
        let (_tx, rx) = watch::channel(false);

        let handle = spawn_sweeper(
            &Handle::current(),
            Arc::downgrade(&target),
            Duration::from_secs(3600),
            rx,
        );

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(target.passes.load(Ordering::SeqCst), 0);

        handle.abort();
    }

    #[tokio::test]
    async fn test_sweeper_stops_on_shutdown_signal() {
        let target = Arc::new(CountingTarget::default());
        let (tx, rx) = watch::channel(false);

        let handle = spawn_sweeper(
            &Handle::current(),
            Arc::downgrade(&target),
            Duration::from_secs(3600),
            rx,
        );

        tx.send(true).unwrap();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should stop after shutdown")
            .unwrap();
    }

    #[tokio::test]
    async fn test_sweeper_stops_when_sender_dropped() {
        let target = Arc::new(CountingTarget::default());
        let (tx, rx) = watch::channel(false);

        let handle = spawn_sweeper(
            &Handle::current(),
            Arc::downgrade(&target),
            Duration::from_secs(3600),
            rx,
        );

        drop(tx);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should stop once the sender is gone")
            .unwrap();
    }

    #[tokio::test]
    async fn test_sweeper_stops_when_target_dropped() {
        let target = Arc::new(CountingTarget::default());
        let (_tx, rx) = watch::channel(false);

        let handle = spawn_sweeper(
            &Handle::current(),
            Arc::downgrade(&target),
            Duration::from_millis(10),
            rx,
        );

        drop(target);
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("sweeper should stop once the target is gone")
            .unwrap();
    }
}
