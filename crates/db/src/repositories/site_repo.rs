//! Read access to the `sites` table.

use sqlx::PgPool;

use crate::models::site::Site;

/// Column list for `sites` queries.
const COLUMNS: &str = "id, company_id, name, custom_id, created_at, updated_at";

pub struct SiteRepo;

impl SiteRepo {
    pub async fn find_by_id(pool: &PgPool, id: &str) -> Result<Option<Site>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM sites WHERE id = $1");
        sqlx::query_as::<_, Site>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List the sites of a company ordered by name.
    pub async fn list_by_company(pool: &PgPool, company_id: &str) -> Result<Vec<Site>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM sites \
             WHERE company_id = $1 ORDER BY name ASC"
        );
        sqlx::query_as::<_, Site>(&query)
            .bind(company_id)
            .fetch_all(pool)
            .await
    }
}
