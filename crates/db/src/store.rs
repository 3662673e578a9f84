//! Postgres-backed implementation of the engine's collaborator traits.

use async_trait::async_trait;
use patrol_core::directory::{Checkpoint, Directory};
use patrol_core::identifiers::OrgNode;
use patrol_core::session::{PatrolSession, StartSession};
use patrol_core::store::{SessionStore, SessionUpdate, StoreError};

use crate::repositories::{AreaRepo, CheckpointRepo, CompanyRepo, PatrolSessionRepo, SiteRepo};
use crate::DbPool;

/// Directory and session store over one connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: DbPool,
}

impl PgStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

fn unavailable(e: sqlx::Error) -> StoreError {
    tracing::error!(error = %e, "Database error");
    StoreError::Unavailable(e.to_string())
}

#[async_trait]
impl Directory for PgStore {
    async fn company(&self, id: &str) -> Result<Option<OrgNode>, StoreError> {
        let row = CompanyRepo::find_by_id(&self.pool, id)
            .await
            .map_err(unavailable)?;
        Ok(row.map(OrgNode::from))
    }

    async fn site(&self, id: &str) -> Result<Option<OrgNode>, StoreError> {
        let row = SiteRepo::find_by_id(&self.pool, id)
            .await
            .map_err(unavailable)?;
        Ok(row.map(OrgNode::from))
    }

    async fn area(&self, id: &str) -> Result<Option<OrgNode>, StoreError> {
        let row = AreaRepo::find_by_id(&self.pool, id)
            .await
            .map_err(unavailable)?;
        Ok(row.map(OrgNode::from))
    }

    async fn checkpoint(&self, id: &str) -> Result<Option<Checkpoint>, StoreError> {
        let row = CheckpointRepo::find_by_id(&self.pool, id)
            .await
            .map_err(unavailable)?;
        Ok(row.map(Checkpoint::from))
    }

    async fn list_checkpoints(&self, area_id: &str) -> Result<Vec<Checkpoint>, StoreError> {
        let rows = CheckpointRepo::list_by_area(&self.pool, area_id)
            .await
            .map_err(unavailable)?;
        Ok(rows.into_iter().map(Checkpoint::from).collect())
    }
}

#[async_trait]
impl SessionStore for PgStore {
    async fn create_session(&self, input: &StartSession) -> Result<PatrolSession, StoreError> {
        let row = PatrolSessionRepo::create(&self.pool, input)
            .await
            .map_err(unavailable)?;
        PatrolSession::try_from(row)
    }

    async fn update_session(
        &self,
        id: &str,
        update: &SessionUpdate,
    ) -> Result<PatrolSession, StoreError> {
        let row = PatrolSessionRepo::update(&self.pool, id, update)
            .await
            .map_err(unavailable)?
            .ok_or_else(|| StoreError::NotFound {
                entity: "PatrolSession",
                id: id.to_string(),
            })?;
        PatrolSession::try_from(row)
    }

    async fn find_session(&self, id: &str) -> Result<Option<PatrolSession>, StoreError> {
        PatrolSessionRepo::find_by_id(&self.pool, id)
            .await
            .map_err(unavailable)?
            .map(PatrolSession::try_from)
            .transpose()
    }

    async fn list_sessions(&self) -> Result<Vec<PatrolSession>, StoreError> {
        PatrolSessionRepo::list(&self.pool)
            .await
            .map_err(unavailable)?
            .into_iter()
            .map(PatrolSession::try_from)
            .collect()
    }
}
