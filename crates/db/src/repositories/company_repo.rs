//! Read access to the `companies` table.

use sqlx::PgPool;

use crate::models::company::Company;

/// Column list for `companies` queries.
const COLUMNS: &str = "id, name, custom_id, created_at, updated_at";

pub struct CompanyRepo;

impl CompanyRepo {
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies WHERE id = $1");
        sqlx::query_as::<_, Company>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all companies ordered by name.
    pub async fn list(pool: &PgPool) -> Result<Vec<Company>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM companies ORDER BY name ASC");
        sqlx::query_as::<_, Company>(&query).fetch_all(pool).await
    }
}
