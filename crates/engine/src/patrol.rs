//! Session state machine driver.
//!
//! [`PatrolEngine`] starts or resumes sessions; each yields an
//! [`ActivePatrol`] that owns the live record until it is submitted or
//! discarded. Scans take `&mut self`, so one session never processes two
//! scans at once. The record itself sits in a `watch` channel and is
//! replaced wholesale on every change, which is what the autosave task
//! reads.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use patrol_core::coverage::{coverage, Coverage};
use patrol_core::directory::{load_snapshot, Directory, DirectorySnapshot};
use patrol_core::error::CoreError;
use patrol_core::location::LocationProvider;
use patrol_core::session::{PatrolSession, ScanRecord, StartSession};
use patrol_core::store::{SessionStore, SessionUpdate};
use patrol_core::validation::validate;
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::autosave::AutosaveHandle;
use crate::config::EngineConfig;
use crate::error::{EngineError, ScanError};
use crate::geolocation::GeolocationGate;

// ---------------------------------------------------------------------------
// Engine
// ---------------------------------------------------------------------------

/// Entry point for session lifecycles. Cheap to clone.
#[derive(Clone)]
pub struct PatrolEngine {
    store: Arc<dyn SessionStore>,
    directory: Arc<dyn Directory>,
    config: EngineConfig,
}

impl PatrolEngine {
    pub fn new(
        store: Arc<dyn SessionStore>,
        directory: Arc<dyn Directory>,
        config: EngineConfig,
    ) -> Self {
        Self {
            store,
            directory,
            config,
        }
    }

    pub fn store(&self) -> &Arc<dyn SessionStore> {
        &self.store
    }

    pub fn directory(&self) -> &Arc<dyn Directory> {
        &self.directory
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Start a new session.
    ///
    /// Input is checked before anything is created, then the company, site
    /// and area are loaded from the directory. Only after both succeed does
    /// the store create the record. Autosave starts immediately.
    pub async fn start(&self, input: &StartSession) -> Result<ActivePatrol, EngineError> {
        input.check()?;
        let snapshot = load_snapshot(
            self.directory.as_ref(),
            &input.company_id,
            &input.site_id,
            &input.area_id,
        )
        .await?;

        let session = self.store.create_session(input).await?;
        tracing::info!(
            session_id = %session.id,
            officer = %session.officer_name,
            area_id = %session.area_id,
            checkpoints = snapshot.total_checkpoints(),
            "Patrol started"
        );

        Ok(self.activate(session, snapshot))
    }

    /// Re-attach an in-progress session loaded from the store.
    pub async fn resume(&self, session: PatrolSession) -> Result<ActivePatrol, EngineError> {
        if !session.is_in_progress() {
            return Err(CoreError::Conflict(format!(
                "Session {} is already submitted ({})",
                session.id, session.status
            ))
            .into());
        }
        let snapshot = load_snapshot(
            self.directory.as_ref(),
            &session.company_id,
            &session.site_id,
            &session.area_id,
        )
        .await?;

        tracing::info!(
            session_id = %session.id,
            scans = session.scans.len(),
            "Patrol resumed"
        );
        Ok(self.activate(session, snapshot))
    }

    fn activate(&self, session: PatrolSession, snapshot: DirectorySnapshot) -> ActivePatrol {
        let (state, _) = watch::channel(Arc::new(session));
        let mut patrol = ActivePatrol {
            snapshot,
            state,
            store: Arc::clone(&self.store),
            gate: GeolocationGate::new(self.config.location_timeout),
            autosave_interval: self.config.autosave_interval,
            autosave: None,
        };
        patrol.start_autosave();
        patrol
    }
}

// ---------------------------------------------------------------------------
// Active session
// ---------------------------------------------------------------------------

/// A session in progress, together with its directory snapshot and
/// autosave task.
pub struct ActivePatrol {
    snapshot: DirectorySnapshot,
    state: watch::Sender<Arc<PatrolSession>>,
    store: Arc<dyn SessionStore>,
    gate: GeolocationGate,
    autosave_interval: Duration,
    autosave: Option<AutosaveHandle>,
}

impl ActivePatrol {
    pub fn id(&self) -> String {
        self.state.borrow().id.clone()
    }

    /// Current snapshot of the session record.
    pub fn session(&self) -> Arc<PatrolSession> {
        Arc::clone(&self.state.borrow())
    }

    pub fn directory(&self) -> &DirectorySnapshot {
        &self.snapshot
    }

    pub fn coverage(&self) -> Coverage {
        coverage(&self.session(), self.snapshot.total_checkpoints())
    }

    /// Receive every new snapshot of the session record.
    pub fn subscribe(&self) -> watch::Receiver<Arc<PatrolSession>> {
        self.state.subscribe()
    }

    pub fn is_autosaving(&self) -> bool {
        self.autosave.as_ref().is_some_and(|h| !h.is_finished())
    }

    /// Validate decoded label text and, if accepted, record it with a
    /// location fix.
    ///
    /// The record is appended only after the fix arrives. Any rejection,
    /// location failure or cancellation leaves the session untouched.
    pub async fn record_scan(
        &mut self,
        raw: &str,
        provider: &dyn LocationProvider,
        cancel: &CancellationToken,
    ) -> Result<ScanRecord, ScanError> {
        let current = self.session();
        if !current.is_in_progress() {
            return Err(ScanError::SessionClosed(current.id.clone()));
        }

        let checkpoint = match validate(raw, &current, &self.snapshot) {
            Ok(checkpoint) => checkpoint.clone(),
            Err(reason) => {
                if reason.is_informational() {
                    tracing::info!(session_id = %current.id, reason = reason.code(), "Repeat scan ignored");
                } else {
                    tracing::warn!(session_id = %current.id, reason = reason.code(), "Scan rejected");
                }
                return Err(reason.into());
            }
        };

        let location = match self.gate.capture(provider, cancel).await {
            Ok(point) => point,
            Err(e) => {
                tracing::warn!(
                    session_id = %current.id,
                    checkpoint_id = %checkpoint.id(),
                    error = %e,
                    "Scan aborted without a location"
                );
                return Err(e);
            }
        };

        let record = ScanRecord::new(&checkpoint, location, Utc::now());
        let mut next = PatrolSession::clone(&current);
        next.append_scan(record.clone())?;
        self.state.send_replace(Arc::new(next));

        tracing::info!(
            session_id = %current.id,
            checkpoint_id = %record.checkpoint_id,
            scan_id = %record.id,
            "Scan recorded"
        );
        Ok(record)
    }

    /// Overwrite the signature. An empty blob clears it.
    pub fn update_signature(&mut self, blob: &str) -> Result<(), EngineError> {
        let current = self.session();
        if !current.is_in_progress() {
            return Err(EngineError::SessionClosed(current.id.clone()));
        }
        let mut next = PatrolSession::clone(&current);
        next.set_signature(blob)?;
        self.state.send_replace(Arc::new(next));
        tracing::debug!(session_id = %current.id, signed = !blob.is_empty(), "Signature updated");
        Ok(())
    }

    /// Close the session and persist the final record.
    ///
    /// Autosave is stopped before the final write so no progress save can
    /// land after it. If the write fails the session stays in progress,
    /// autosave restarts and the error is returned for the caller to retry.
    pub async fn submit(&mut self) -> Result<(PatrolSession, Coverage), EngineError> {
        let current = self.session();
        if !current.is_in_progress() {
            return Err(EngineError::SessionClosed(current.id.clone()));
        }
        if !current.is_signed() {
            tracing::warn!(session_id = %current.id, "Submitting unsigned patrol");
        }

        if let Some(handle) = self.autosave.take() {
            handle.stop().await;
        }

        let mut finished = PatrolSession::clone(&current);
        let result = finished.finalize(self.snapshot.total_checkpoints(), Utc::now())?;

        if let Err(e) = self
            .store
            .update_session(&finished.id, &SessionUpdate::submission(&finished))
            .await
        {
            tracing::error!(session_id = %current.id, error = %e, "Failed to submit patrol");
            self.start_autosave();
            return Err(e.into());
        }

        self.state.send_replace(Arc::new(finished.clone()));
        tracing::info!(
            session_id = %finished.id,
            status = %result.status,
            scanned = result.unique_scanned,
            total = result.total,
            "Patrol submitted"
        );
        Ok((finished, result))
    }

    /// Write the current in-progress state immediately, outside the
    /// autosave schedule. Used when the server shuts down.
    pub async fn save_progress(&self) -> Result<(), EngineError> {
        let current = self.session();
        if !current.is_in_progress() {
            return Err(EngineError::SessionClosed(current.id.clone()));
        }
        self.store
            .update_session(&current.id, &SessionUpdate::progress(&current))
            .await?;
        tracing::debug!(session_id = %current.id, scans = current.scans.len(), "Progress saved");
        Ok(())
    }

    /// Release the session without submitting.
    ///
    /// Autosave is stopped and the current state written once more, so the
    /// stored record stays in progress with every recorded scan. A failed
    /// write is logged; the store then keeps the last autosaved state.
    pub async fn discard(mut self) -> PatrolSession {
        if let Some(handle) = self.autosave.take() {
            handle.stop().await;
        }
        if let Err(e) = self.save_progress().await {
            tracing::warn!(session_id = %self.id(), error = %e, "Failed to save discarded patrol");
        }
        let session = self.session();
        tracing::info!(session_id = %session.id, "Patrol discarded");
        PatrolSession::clone(&session)
    }

    fn start_autosave(&mut self) {
        self.autosave = Some(AutosaveHandle::spawn(
            Arc::clone(&self.store),
            self.state.subscribe(),
            self.autosave_interval,
        ));
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use patrol_core::directory::Checkpoint;
    use patrol_core::identifiers::OrgNode;
    use patrol_core::location::{GeoPoint, ReportedLocation};
    use patrol_core::session::Shift;

    use crate::memory::MemoryStore;

    async fn engine() -> (Arc<MemoryStore>, PatrolEngine) {
        let store = Arc::new(MemoryStore::new());
        store.add_company(OrgNode::new("comp1", "Acme")).await;
        store.add_site(OrgNode::new("site1", "Downtown")).await;
        store.add_area(OrgNode::new("area1", "Lobby")).await;
        store.add_checkpoint(Checkpoint::new("p1", "Front door", "area1")).await;
        let engine = PatrolEngine::new(store.clone(), store.clone(), EngineConfig::default());
        (store, engine)
    }

    fn input() -> StartSession {
        StartSession {
            officer_name: "Officer".to_string(),
            company_id: "comp1".to_string(),
            site_id: "site1".to_string(),
            area_id: "area1".to_string(),
            shift: Shift::Day,
        }
    }

    #[tokio::test]
    async fn start_rejects_unknown_area_without_creating() {
        let (store, engine) = engine().await;
        let mut bad = input();
        bad.area_id = "nowhere".to_string();

        let err = engine.start(&bad).await.err().unwrap();
        assert_matches!(err, EngineError::Core(CoreError::NotFound { entity: "Area", .. }));
        assert!(store.list_sessions().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn start_rejects_blank_officer() {
        let (_store, engine) = engine().await;
        let mut bad = input();
        bad.officer_name = " ".to_string();

        let err = engine.start(&bad).await.err().unwrap();
        assert_matches!(err, EngineError::Core(CoreError::Validation(_)));
    }

    #[tokio::test]
    async fn resume_of_submitted_session_is_conflict() {
        let (_store, engine) = engine().await;
        let mut patrol = engine.start(&input()).await.unwrap();
        let (finished, _) = patrol.submit().await.unwrap();

        let err = engine.resume(finished).await.err().unwrap();
        assert_matches!(err, EngineError::Core(CoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn signature_can_be_set_and_cleared() {
        let (_store, engine) = engine().await;
        let mut patrol = engine.start(&input()).await.unwrap();

        patrol.update_signature("data:image/png;base64,AAAA").unwrap();
        assert!(patrol.session().is_signed());
        patrol.update_signature("").unwrap();
        assert!(!patrol.session().is_signed());
    }

    #[tokio::test]
    async fn subscribers_see_recorded_scans() {
        let (_store, engine) = engine().await;
        let mut patrol = engine.start(&input()).await.unwrap();
        let mut rx = patrol.subscribe();

        let raw = r#"{"type":"patrol-point","pointId":"p1","companyIdentifier":"comp1","siteIdentifier":"site1","areaIdentifier":"area1"}"#;
        let fix = ReportedLocation(Ok(GeoPoint::new(1.0, 2.0)));
        patrol
            .record_scan(raw, &fix, &CancellationToken::new())
            .await
            .unwrap();

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().scans.len(), 1);
    }
}
