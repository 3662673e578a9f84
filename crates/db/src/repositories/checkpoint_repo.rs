//! Read access to the `checkpoints` table.

use sqlx::PgPool;

use crate::models::checkpoint::Checkpoint;

/// Column list for `checkpoints` queries.
const COLUMNS: &str = "\
    id, area_id, name, custom_id, sort_order, created_at, updated_at";

pub struct CheckpointRepo;

impl CheckpointRepo {
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Checkpoint>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM checkpoints WHERE id = $1");
        sqlx::query_as::<_, Checkpoint>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the checkpoints of an area in display order.
    pub async fn list_by_area(pool: &PgPool, area_id: &str) -> Result<Vec<Checkpoint>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM checkpoints \
             WHERE area_id = $1 ORDER BY sort_order ASC, name ASC"
        );
        sqlx::query_as::<_, Checkpoint>(&query)
            .bind(area_id)
            .fetch_all(pool)
            .await
    }
}
