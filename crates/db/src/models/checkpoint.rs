//! Checkpoint rows. Display order within an area is `sort_order`, then name.

use patrol_core::directory;
use patrol_core::identifiers::OrgNode;
use patrol_core::types::{EntityId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `checkpoints` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Checkpoint {
    pub id: EntityId,
    pub area_id: EntityId,
    pub name: String,
    pub custom_id: Option<String>,
    pub sort_order: i32,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Checkpoint> for directory::Checkpoint {
    fn from(row: Checkpoint) -> Self {
        directory::Checkpoint {
            node: OrgNode {
                id: row.id,
                name: row.name,
                custom_id: row.custom_id,
            },
            area_id: row.area_id,
        }
    }
}
