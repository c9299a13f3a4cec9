//! Background expiration sweep.
//!
//! Calls `run_expiration_sweep` on a fixed interval until shut down. A failed
//! sweep is logged and retried on the next tick; reclamation is eventual.

use std::time::Duration;

use sqlcache_core::CacheStore;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Handle to a running sweeper task.
pub struct Sweeper {
    shutdown: watch::Sender<bool>,
    task: JoinHandle<()>,
}

impl Sweeper {
    /// Start sweeping `store` every `period`. The first sweep runs immediately.
    pub fn spawn(store: CacheStore, period: Duration) -> Self {
        let (shutdown, mut stop) = watch::channel(false);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(e) = store.run_expiration_sweep().await {
                            tracing::error!(error = %e, "Expiration sweep failed");
                        }
                    }
                    changed = stop.changed() => {
                        if changed.is_err() || *stop.borrow() {
                            break;
                        }
                    }
                }
            }

            tracing::debug!("Expiration sweeper stopped");
        });

        tracing::info!(period_secs = period.as_secs(), "Expiration sweeper started");
        Self { shutdown, task }
    }

    /// Stop the sweeper and wait for an in-flight sweep to finish.
    pub async fn shutdown(self) {
        let _ = self.shutdown.send(true);
        if let Err(e) = self.task.await {
            tracing::warn!(error = %e, "Expiration sweeper task did not exit cleanly");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, Utc};
    use sqlcache_core::{EntryOptions, ManualClock, StoreConfig};
    use std::sync::Arc;

    #[tokio::test]
    async fn test_sweeper_reclaims_expired_entries() {
        let clock = Arc::new(ManualClock::new(Utc::now()));
        let store = CacheStore::open_in_memory(StoreConfig::default())
            .await
            .unwrap()
            .with_clock(clock.clone());
        store
            .set("k", b"v", EntryOptions::new().with_sliding(Duration::from_secs(5)))
            .await
            .unwrap();
        clock.advance(ChronoDuration::seconds(10));

        let sweeper = Sweeper::spawn(store.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(200)).await;
        sweeper.shutdown().await;

        assert!(store.get_entry("k", false).await.unwrap().is_none());
        assert_eq!(store.run_expiration_sweep().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_sweeper_shutdown_is_prompt() {
        let store = CacheStore::open_in_memory(StoreConfig::default()).await.unwrap();
        let sweeper = Sweeper::spawn(store, Duration::from_secs(3600));

        tokio::time::timeout(Duration::from_secs(5), sweeper.shutdown())
            .await
            .expect("sweeper should stop without waiting for the next tick");
    }
}
