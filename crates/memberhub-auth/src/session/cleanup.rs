//! Periodic purge of expired sessions.

use std::time::Duration;

use tokio::sync::watch;
use tokio::time::{self, MissedTickBehavior};
use tracing::{error, info};

use memberhub_core::AppResult;

use super::manager::SessionManager;

/// Deletes expired sessions on a fixed interval.
///
/// A failed sweep is logged and retried on the next tick. An extension
/// that races a sweep can lose, but the sweep only removes rows already
/// past expiry.
#[derive(Debug, Clone)]
pub struct SessionCleanup {
    manager: SessionManager,
}

impl SessionCleanup {
    /// Creates a new cleanup handler.
    pub fn new(manager: SessionManager) -> Self {
        Self { manager }
    }

    /// Runs one sweep, returning the number of sessions deleted.
    pub async fn run_cleanup(&self) -> AppResult<u64> {
        let deleted = self.manager.cleanup_expired().await?;
        if deleted > 0 {
            info!(deleted, "Expired sessions cleaned up");
        }
        Ok(deleted)
    }

    /// Sweeps every `interval` until `shutdown` turns `true`.
    ///
    /// The first sweep runs immediately.
    pub async fn run(self, interval: Duration, mut shutdown: watch::Receiver<bool>) {
        info!(interval_secs = interval.as_secs(), "Session cleanup task started");

        let mut ticker = time::interval(interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        break;
                    }
                }
                _ = ticker.tick() => {
                    if let Err(e) = self.run_cleanup().await {
                        error!(error = %e, "Session cleanup failed");
                    }
                }
            }
        }

        info!("Session cleanup task stopped");
    }
}
