use patrol_core::identifiers::OrgNode;
use patrol_core::types::{EntityId, Timestamp};
use serde::Serialize;
use sqlx::FromRow;

/// A row from the `companies` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Company {
    pub id: EntityId,
    pub name: String,
    pub custom_id: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl From<Company> for OrgNode {
    fn from(row: Company) -> Self {
        OrgNode {
            id: row.id,
            name: row.name,
            custom_id: row.custom_id,
        }
    }
}
