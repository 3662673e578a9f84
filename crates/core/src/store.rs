//! Session persistence capability.

use async_trait::async_trait;

use crate::error::CoreError;
use crate::session::{PatrolSession, PatrolStatus, ScanRecord, StartSession};
use crate::types::{EntityId, Timestamp};

/// Failure reported by a persistence or directory collaborator.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("{entity} with id {id} not found")]
    NotFound { entity: &'static str, id: EntityId },

    #[error("Storage unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

impl From<StoreError> for CoreError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { entity, id } => CoreError::NotFound { entity, id },
            other => CoreError::Internal(other.to_string()),
        }
    }
}

/// Partial update of a stored session. `None` fields are left untouched.
///
/// These are the only fields that change after creation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SessionUpdate {
    pub end_time: Option<Timestamp>,
    pub status: Option<PatrolStatus>,
    pub scans: Option<Vec<ScanRecord>>,
    /// `Some(None)` clears the stored signature.
    pub signature: Option<Option<String>>,
}

impl SessionUpdate {
    /// In-progress state flushed by autosave.
    pub fn progress(session: &PatrolSession) -> Self {
        Self {
            end_time: None,
            status: None,
            scans: Some(session.scans.clone()),
            signature: Some(session.signature.clone()),
        }
    }

    /// Final state written at submission.
    pub fn submission(session: &PatrolSession) -> Self {
        Self {
            end_time: session.end_time,
            status: Some(session.status),
            scans: Some(session.scans.clone()),
            signature: Some(session.signature.clone()),
        }
    }

    pub fn apply_to(&self, session: &mut PatrolSession) {
        if let Some(end_time) = self.end_time {
            session.end_time = Some(end_time);
        }
        if let Some(status) = self.status {
            session.status = status;
        }
        if let Some(scans) = &self.scans {
            session.scans = scans.clone();
        }
        if let Some(signature) = &self.signature {
            session.signature = signature.clone();
        }
    }
}

/// Where sessions are created, saved and read back as reports.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Persist a new in-progress session. The store assigns `id` and
    /// `start_time`.
    async fn create_session(&self, input: &StartSession) -> Result<PatrolSession, StoreError>;

    async fn update_session(
        &self,
        id: &str,
        update: &SessionUpdate,
    ) -> Result<PatrolSession, StoreError>;

    async fn find_session(&self, id: &str) -> Result<Option<PatrolSession>, StoreError>;

    /// All stored sessions, most recently started first.
    async fn list_sessions(&self) -> Result<Vec<PatrolSession>, StoreError>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    use crate::directory::Checkpoint;
    use crate::location::GeoPoint;
    use crate::session::Shift;

    fn session() -> PatrolSession {
        let input = StartSession {
            officer_name: "Officer".to_string(),
            company_id: "comp1".to_string(),
            site_id: "site1".to_string(),
            area_id: "area1".to_string(),
            shift: Shift::Day,
        };
        PatrolSession::begin("patrol1", &input, Utc::now()).unwrap()
    }

    #[test]
    fn progress_update_leaves_status_alone() {
        let mut live = session();
        live.append_scan(ScanRecord::new(
            &Checkpoint::new("p1", "Gate", "area1"),
            GeoPoint::new(1.0, 2.0),
            Utc::now(),
        ))
        .unwrap();
        live.set_signature("sig").unwrap();

        let update = SessionUpdate::progress(&live);
        assert!(update.status.is_none());
        assert!(update.end_time.is_none());

        let mut stored = session();
        update.apply_to(&mut stored);
        assert_eq!(stored.scans.len(), 1);
        assert_eq!(stored.signature.as_deref(), Some("sig"));
        assert_eq!(stored.status, PatrolStatus::InProgress);
    }

    #[test]
    fn submission_update_carries_terminal_state() {
        let mut live = session();
        live.finalize(1, Utc::now()).unwrap();

        let mut stored = session();
        SessionUpdate::submission(&live).apply_to(&mut stored);
        assert_eq!(stored.status, PatrolStatus::MissedPoints);
        assert_eq!(stored.end_time, live.end_time);
    }

    #[test]
    fn cleared_signature_is_propagated() {
        let mut stored = session();
        stored.signature = Some("old".to_string());

        let live = session();
        SessionUpdate::progress(&live).apply_to(&mut stored);
        assert!(stored.signature.is_none());
    }

    #[test]
    fn not_found_maps_to_core_not_found() {
        let err: CoreError = StoreError::NotFound {
            entity: "PatrolSession",
            id: "x".to_string(),
        }
        .into();
        assert!(matches!(err, CoreError::NotFound { entity: "PatrolSession", .. }));
    }
}
