//! Periodic flush of in-progress session state.
//!
//! The scheduler watches the session through a `watch` channel holding an
//! `Arc<PatrolSession>`. Writers replace the whole `Arc`, so each tick reads
//! a complete snapshot without holding any lock across the store call.
//! A failed save is logged and simply retried on the next tick.

use std::sync::Arc;
use std::time::Duration;

use patrol_core::session::PatrolSession;
use patrol_core::store::{SessionStore, SessionUpdate};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Handle to a running autosave task.
///
/// Dropping the handle cancels the task; [`AutosaveHandle::stop`] also
/// waits for an in-flight save to finish.
pub struct AutosaveHandle {
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl AutosaveHandle {
    /// Spawn the autosave loop. The first save happens one full `period`
    /// after this call.
    pub fn spawn(
        store: Arc<dyn SessionStore>,
        snapshots: watch::Receiver<Arc<PatrolSession>>,
        period: Duration,
    ) -> Self {
        let cancel = CancellationToken::new();
        let task = tokio::spawn(run(store, snapshots, period, cancel.clone()));
        Self {
            cancel,
            task: Some(task),
        }
    }

    /// Cancel the loop and wait until it has exited.
    ///
    /// After this returns no further autosave write can reach the store.
    pub async fn stop(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            if let Err(e) = task.await {
                tracing::error!(error = %e, "Autosave task panicked");
            }
        }
    }

    pub fn is_finished(&self) -> bool {
        self.task.as_ref().map_or(true, JoinHandle::is_finished)
    }
}

impl Drop for AutosaveHandle {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Run the autosave loop until cancelled, until the session leaves
/// `InProgress`, or until the session owner goes away.
pub async fn run(
    store: Arc<dyn SessionStore>,
    snapshots: watch::Receiver<Arc<PatrolSession>>,
    period: Duration,
    cancel: CancellationToken,
) {
    let session_id = snapshots.borrow().id.clone();
    tracing::debug!(
        session_id = %session_id,
        interval_secs = period.as_secs(),
        "Autosave started"
    );

    let mut interval = tokio::time::interval_at(Instant::now() + period, period);
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                tracing::debug!(session_id = %session_id, "Autosave stopping");
                break;
            }
            _ = interval.tick() => {
                if snapshots.has_changed().is_err() {
                    tracing::debug!(session_id = %session_id, "Session owner gone, autosave stopping");
                    break;
                }

                let snapshot = Arc::clone(&snapshots.borrow());
                if !snapshot.is_in_progress() {
                    tracing::debug!(session_id = %session_id, "Session closed, autosave stopping");
                    break;
                }

                match store
                    .update_session(&snapshot.id, &SessionUpdate::progress(&snapshot))
                    .await
                {
                    Ok(_) => {
                        tracing::debug!(
                            session_id = %session_id,
                            scans = snapshot.scans.len(),
                            "Autosaved session"
                        );
                    }
                    Err(e) => {
                        tracing::warn!(
                            session_id = %session_id,
                            error = %e,
                            "Autosave failed, retrying next tick"
                        );
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
