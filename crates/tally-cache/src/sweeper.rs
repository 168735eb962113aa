//! Background reclamation of expired entries.

use std::hash::Hash;
use std::sync::Weak;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::cache::Inner;
use crate::error::{Error, Result};

/// Shortest interval the sweeper will tick at.
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running sweeper task.
///
/// Dropping the handle cancels the task. Use [`shutdown`](Self::shutdown) to
/// cancel and wait for it to finish.
#[derive(Debug)]
pub struct Sweeper {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl Sweeper {
    pub(crate) fn spawn<K, V>(cache: Weak<Inner<K, V>>, interval: Duration) -> Self
    where
        K: Eq + Hash + Send + Sync + 'static,
        V: Send + Sync + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let interval = interval.max(MIN_INTERVAL);

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // The first tick completes immediately; nothing can be expired yet.
            ticker.tick().await;

            debug!(interval_ms = interval.as_millis() as u64, "Cache sweeper started");

            loop {
                tokio::select! {
                    _ = token.cancelled() => {
                        debug!("Cache sweeper cancelled");
                        break;
                    }
                    _ = ticker.tick() => {
                        let Some(inner) = cache.upgrade() else {
                            debug!("Cache dropped, sweeper exiting");
                            break;
                        };
                        inner.purge_expired();
                    }
                }
            }
        });

        Self { cancel, handle }
    }

    /// Whether the task has ended.
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Cancel the sweeper and wait for it to exit.
    pub async fn shutdown(mut self) -> Result<()> {
        self.cancel.cancel();
        (&mut self.handle)
            .await
            .map_err(|e| Error::SweeperStopped(e.to_string()))
    }
}

impl Drop for Sweeper {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}
