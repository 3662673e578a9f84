use std::sync::Arc;

use patrol_engine::PatrolEngine;

use crate::config::ServerConfig;
use crate::registry::SessionRegistry;

/// Shared application state available to all Axum handlers via `State<AppState>`.
///
/// This is cheaply cloneable (inner data is behind `Arc` or is already `Clone`).
#[derive(Clone)]
pub struct AppState {
    /// Session lifecycle driver over the configured collaborators.
    pub engine: PatrolEngine,
    /// Sessions currently in progress on this server.
    pub registry: Arc<SessionRegistry>,
    pub config: Arc<ServerConfig>,
    /// Database pool, when the engine is backed by Postgres. `None` when
    /// running on the in-memory store.
    pub pool: Option<patrol_db::DbPool>,
}
