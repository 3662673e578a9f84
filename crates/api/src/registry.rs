//! Active session registry.
//!
//! Each in-progress session served by this process has one
//! [`ActivePatrol`] behind its own `tokio::sync::Mutex`, so requests for the
//! same session run one at a time while different sessions proceed
//! independently. The outer lock is only held to look up or swap entries.

use std::collections::HashMap;
use std::sync::Arc;

use patrol_core::types::EntityId;
use patrol_engine::ActivePatrol;
use tokio::sync::{Mutex, RwLock};

pub type SharedPatrol = Arc<Mutex<ActivePatrol>>;

#[derive(Default)]
pub struct SessionRegistry {
    sessions: RwLock<HashMap<EntityId, SharedPatrol>>,
}

impl SessionRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, id: &str) -> Option<SharedPatrol> {
        self.sessions.read().await.get(id).cloned()
    }

    /// Register a patrol unless one with the same id is already active.
    ///
    /// Returns whichever patrol ends up registered. A losing duplicate is
    /// dropped here, which cancels its autosave.
    pub async fn insert(&self, patrol: ActivePatrol) -> SharedPatrol {
        let id = patrol.id();
        let mut sessions = self.sessions.write().await;
        Arc::clone(
            sessions
                .entry(id)
                .or_insert_with(|| Arc::new(Mutex::new(patrol))),
        )
    }

    pub async fn remove(&self, id: &str) -> Option<SharedPatrol> {
        self.sessions.write().await.remove(id)
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }

    /// Take every registered patrol, leaving the registry empty.
    pub async fn drain(&self) -> Vec<SharedPatrol> {
        self.sessions.write().await.drain().map(|(_, p)| p).collect()
    }
}
