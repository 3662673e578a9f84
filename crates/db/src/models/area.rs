use patrol_core::identifiers::OrgNode;
use patrol_core::types::{EntityId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `areas` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Area {
    pub id: EntityId,
    pub site_id: EntityId,
    pub name: String,
    pub custom_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Area> for OrgNode {
    fn from(row: Area) -> Self {
        OrgNode {
            id: row.id,
            name: row.name,
            custom_id: row.custom_id,
        }
    }
}
