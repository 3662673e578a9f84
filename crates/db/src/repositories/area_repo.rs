//! Read access to the `areas` table.

use sqlx::PgPool;

use crate::models::area::Area;

/// Column list for `areas` queries.
const COLUMNS: &str = "id, site_id, name, custom_id, created_at, updated_at";

pub struct AreaRepo;

impl AreaRepo {
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Area>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM areas WHERE id = $1");
        sqlx::query_as::<_, Area>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the areas of a site ordered by name.
    pub async fn list_by_site(pool: &PgPool, site_id: &str) -> Result<Vec<Area>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM areas \
             WHERE site_id = $1 ORDER BY name ASC"
        );
        sqlx::query_as::<_, Area>(&query)
            .bind(site_id)
            .fetch_all(pool)
            .await
    }
}
