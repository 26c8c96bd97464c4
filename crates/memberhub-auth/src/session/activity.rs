//! Best-effort last-activity recording.
//!
//! Request handlers submit session IDs to a bounded queue; one background
//! task drains it into the store. Submission never blocks and never fails
//! the request: when the queue is full the update is dropped.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::debug;

use memberhub_entity::session::short_id;

use super::store::SessionStore;

/// Handle for submitting activity updates.
#[derive(Debug, Clone)]
pub struct ActivityRecorder {
    tx: mpsc::Sender<String>,
}

impl ActivityRecorder {
    /// Starts the drain task. It exits once every recorder handle is dropped.
    pub fn spawn(store: Arc<dyn SessionStore>, capacity: usize) -> (Self, JoinHandle<()>) {
        let (tx, mut rx) = mpsc::channel::<String>(capacity.max(1));

        let handle = tokio::spawn(async move {
            while let Some(session_id) = rx.recv().await {
                if let Err(e) = store.update_activity(&session_id).await {
                    debug!(
                        session_id = %short_id(&session_id),
                        error = %e,
                        "Failed to update session activity"
                    );
                }
            }
            debug!("Activity recorder stopped");
        });

        (Self { tx }, handle)
    }

    /// Queues an activity update for `session_id`.
    pub fn record(&self, session_id: &str) {
        match self.tx.try_send(session_id.to_string()) {
            Ok(()) => {}
            Err(TrySendError::Full(_)) => {
                debug!(session_id = %short_id(session_id), "Activity queue full, update dropped");
            }
            Err(TrySendError::Closed(_)) => {
                debug!(session_id = %short_id(session_id), "Activity recorder closed, update dropped");
            }
        }
    }
}
