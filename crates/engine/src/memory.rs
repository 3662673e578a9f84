//! In-memory directory and session store.
//!
//! Backs the engine and API tests, and local runs without a database.
//! `set_unavailable` makes every session write fail, which is how tests
//! exercise autosave retries and failed submissions.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use patrol_core::directory::{Checkpoint, Directory};
use patrol_core::identifiers::OrgNode;
use patrol_core::session::{PatrolSession, StartSession};
use patrol_core::store::{SessionStore, SessionUpdate, StoreError};
use tokio::sync::RwLock;

#[derive(Default)]
struct Tables {
    companies: HashMap<String, OrgNode>,
    sites: HashMap<String, OrgNode>,
    areas: HashMap<String, OrgNode>,
    /// Insertion order doubles as display order.
    checkpoints: Vec<Checkpoint>,
    sessions: HashMap<String, PatrolSession>,
}

#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
    unavailable: AtomicBool,
    update_calls: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn add_company(&self, node: OrgNode) {
        self.tables.write().await.companies.insert(node.id.clone(), node);
    }

    pub async fn add_site(&self, node: OrgNode) {
        self.tables.write().await.sites.insert(node.id.clone(), node);
    }

    pub async fn add_area(&self, node: OrgNode) {
        self.tables.write().await.areas.insert(node.id.clone(), node);
    }

    pub async fn add_checkpoint(&self, checkpoint: Checkpoint) {
        self.tables.write().await.checkpoints.push(checkpoint);
    }

    /// Make session writes fail with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    /// Number of `update_session` calls so far, failed ones included.
    pub fn update_count(&self) -> usize {
        self.update_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Unavailable("memory store offline".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl Directory for MemoryStore {
    async fn company(&self, id: &str) -> Result<Option<OrgNode>, StoreError> {
        Ok(self.tables.read().await.companies.get(id).cloned())
    }

    async fn site(&self, id: &str) -> Result<Option<OrgNode>, StoreError> {
        Ok(self.tables.read().await.sites.get(id).cloned())
    }

    async fn area(&self, id: &str) -> Result<Option<OrgNode>, StoreError> {
        Ok(self.tables.read().await.areas.get(id).cloned())
    }

    async fn checkpoint(&self, id: &str) -> Result<Option<Checkpoint>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables.checkpoints.iter().find(|c| c.id() == id).cloned())
    }

    async fn list_checkpoints(&self, area_id: &str) -> Result<Vec<Checkpoint>, StoreError> {
        let tables = self.tables.read().await;
        Ok(tables
            .checkpoints
            .iter()
            .filter(|c| c.area_id == area_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, input: &StartSession) -> Result<PatrolSession, StoreError> {
        self.check_available()?;
        let id = uuid::Uuid::new_v4().to_string();
        let session = PatrolSession::begin(id, input, Utc::now())
            .map_err(|e| StoreError::Corrupt(e.to_string()))?;
        self.tables
            .write()
            .await
            .sessions
            .insert(session.id.clone(), session.clone());
        Ok(session)
    }

    async fn update_session(
        &self,
        id: &str,
        update: &SessionUpdate,
    ) -> Result<PatrolSession, StoreError> {
        self.update_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let mut tables = self.tables.write().await;
        let session = tables
            .sessions
            .get_mut(id)
            .ok_or_else(|| StoreError::NotFound {
                entity: "PatrolSession",
                id: id.to_string(),
            })?;
        update.apply_to(session);
        Ok(session.clone())
    }

    async fn find_session(&self, id: &str) -> Result<Option<PatrolSession>, StoreError> {
        Ok(self.tables.read().await.sessions.get(id).cloned())
    }

    async fn list_sessions(&self) -> Result<Vec<PatrolSession>, StoreError> {
        let tables = self.tables.read().await;
        let mut sessions: Vec<PatrolSession> = tables.sessions.values().cloned().collect();
        sessions.sort_by(|a, b| b.start_time.cmp(&a.start_time));
        Ok(sessions)
    }
}
