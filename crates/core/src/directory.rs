//! Read-only view of the organizational hierarchy used during a session.
//!
//! The engine never edits companies, sites, areas or checkpoints. It asks a
//! [`Directory`] collaborator for them once, at session start, and keeps the
//! result as a [`DirectorySnapshot`] with checkpoints indexed by id.

use std::collections::hash_map::Entry;
use std::collections::HashMap;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::identifiers::OrgNode;
use crate::store::StoreError;
use crate::types::EntityId;

/// A physical inspection point belonging to an area.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkpoint {
    #[serde(flatten)]
    pub node: OrgNode,
    pub area_id: EntityId,
}

impl Checkpoint {
    pub fn new(
        id: impl Into<EntityId>,
        name: impl Into<String>,
        area_id: impl Into<EntityId>,
    ) -> Self {
        Self {
            node: OrgNode::new(id, name),
            area_id: area_id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.node.id
    }

    pub fn name(&self) -> &str {
        &self.node.name
    }
}

/// Lookup capability over the organizational hierarchy.
///
/// Implemented by the database layer and by the engine's in-memory store.
#[async_trait]
pub trait Directory: Send + Sync {
    async fn company(&self, id: &str) -> Result<Option<OrgNode>, StoreError>;

    async fn site(&self, id: &str) -> Result<Option<OrgNode>, StoreError>;

    async fn area(&self, id: &str) -> Result<Option<OrgNode>, StoreError>;

    async fn checkpoint(&self, id: &str) -> Result<Option<Checkpoint>, StoreError>;

    /// All checkpoints of an area, in display order.
    async fn list_checkpoints(&self, area_id: &str) -> Result<Vec<Checkpoint>, StoreError>;
}

/// The session's organizational context, captured at session start.
#[derive(Debug, Clone)]
pub struct DirectorySnapshot {
    pub company: OrgNode,
    pub site: OrgNode,
    pub area: OrgNode,
    /// Checkpoint ids in display order.
    order: Vec<EntityId>,
    checkpoints: HashMap<EntityId, Checkpoint>,
}

impl DirectorySnapshot {
    pub fn new(
        company: OrgNode,
        site: OrgNode,
        area: OrgNode,
        checkpoints: Vec<Checkpoint>,
    ) -> Self {
        let mut order = Vec::with_capacity(checkpoints.len());
        let mut index = HashMap::with_capacity(checkpoints.len());
        for checkpoint in checkpoints {
            let id = checkpoint.id().to_string();
            if let Entry::Vacant(slot) = index.entry(id.clone()) {
                slot.insert(checkpoint);
                order.push(id);
            }
        }
        Self {
            company,
            site,
            area,
            order,
            checkpoints: index,
        }
    }

    pub fn checkpoint(&self, id: &str) -> Option<&Checkpoint> {
        self.checkpoints.get(id)
    }

    /// Checkpoints in display order.
    pub fn checkpoints(&self) -> impl Iterator<Item = &Checkpoint> {
        self.order.iter().filter_map(|id| self.checkpoints.get(id))
    }

    /// Number of distinct checkpoints in the area.
    pub fn total_checkpoints(&self) -> usize {
        self.checkpoints.len()
    }
}

/// Load the snapshot for a company/site/area triple.
///
/// Fails with [`CoreError::NotFound`] when any of the three nodes is unknown.
pub async fn load_snapshot(
    directory: &dyn Directory,
    company_id: &str,
    site_id: &str,
    area_id: &str,
) -> Result<DirectorySnapshot, CoreError> {
    let company = directory
        .company(company_id)
        .await?
        .ok_or_else(|| not_found("Company", company_id))?;
    let site = directory
        .site(site_id)
        .await?
        .ok_or_else(|| not_found("Site", site_id))?;
    let area = directory
        .area(area_id)
        .await?
        .ok_or_else(|| not_found("Area", area_id))?;
    let checkpoints = directory.list_checkpoints(area_id).await?;

    Ok(DirectorySnapshot::new(company, site, area, checkpoints))
}

fn not_found(entity: &'static str, id: &str) -> CoreError {
    CoreError::NotFound {
        entity,
        id: id.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot_with(checkpoints: Vec<Checkpoint>) -> DirectorySnapshot {
        DirectorySnapshot::new(
            OrgNode::new("comp1", "Acme"),
            OrgNode::new("site1", "Downtown"),
            OrgNode::new("area1", "Lobby"),
            checkpoints,
        )
    }

    #[test]
    fn indexes_checkpoints_by_id() {
        let snapshot = snapshot_with(vec![
            Checkpoint::new("p1", "Front door", "area1"),
            Checkpoint::new("p2", "Back door", "area1"),
        ]);

        assert_eq!(snapshot.total_checkpoints(), 2);
        assert_eq!(snapshot.checkpoint("p2").map(Checkpoint::name), Some("Back door"));
        assert!(snapshot.checkpoint("p3").is_none());
    }

    #[test]
    fn keeps_display_order_and_drops_duplicate_ids() {
        let snapshot = snapshot_with(vec![
            Checkpoint::new("p2", "Back door", "area1"),
            Checkpoint::new("p1", "Front door", "area1"),
            Checkpoint::new("p2", "Back door (dup)", "area1"),
        ]);

        let ids: Vec<&str> = snapshot.checkpoints().map(Checkpoint::id).collect();
        assert_eq!(ids, vec!["p2", "p1"]);
        assert_eq!(snapshot.total_checkpoints(), 2);
        assert_eq!(snapshot.checkpoint("p2").map(Checkpoint::name), Some("Back door"));
    }

    #[test]
    fn checkpoint_serializes_flat() {
        let checkpoint = Checkpoint::new("p1", "Front door", "area1");
        let json = serde_json::to_value(&checkpoint).unwrap();
        assert_eq!(json["id"], "p1");
        assert_eq!(json["name"], "Front door");
        assert_eq!(json["areaId"], "area1");
    }
}
