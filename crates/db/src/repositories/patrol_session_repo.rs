//! Repository for the `patrol_sessions` table.

use patrol_core::session::StartSession;
use patrol_core::store::SessionUpdate;
use sqlx::types::Json;
use sqlx::PgPool;

use crate::models::patrol_session::PatrolSessionRow;

/// Column list for `patrol_sessions` queries.
const COLUMNS: &str = "\
    id, officer_name, company_id, site_id, area_id, start_time, end_time, \
    shift, status, scans, signature_data_url, created_at, updated_at";

pub struct PatrolSessionRepo;

impl PatrolSessionRepo {
    /// Insert a new in-progress session. The database assigns `id` and
    /// `start_time`.
    pub async fn create(
        pool: &PgPool,
        input: &StartSession,
    ) -> Result<PatrolSessionRow, sqlx::Error> {
        let query = format!(
            "INSERT INTO patrol_sessions (officer_name, company_id, site_id, area_id, shift)
             VALUES ($1, $2, $3, $4, $5)
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PatrolSessionRow>(&query)
            .bind(input.officer_name.trim())
            .bind(&input.company_id)
            .bind(&input.site_id)
            .bind(&input.area_id)
            .bind(input.shift.as_str())
            .fetch_one(pool)
            .await
    }

    pub async fn find_by_id(
        pool: &PgPool,
        id: &str,
    ) -> Result<Option<PatrolSessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM patrol_sessions WHERE id = $1");
        sqlx::query_as::<_, PatrolSessionRow>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// List all sessions, most recently started first.
    pub async fn list(pool: &PgPool) -> Result<Vec<PatrolSessionRow>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM patrol_sessions ORDER BY start_time DESC");
        sqlx::query_as::<_, PatrolSessionRow>(&query)
            .fetch_all(pool)
            .await
    }

    /// Apply a partial update. Only `Some` fields in `update` are written;
    /// `signature: Some(None)` clears the stored signature.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: &str,
        update: &SessionUpdate,
    ) -> Result<Option<PatrolSessionRow>, sqlx::Error> {
        let query = format!(
            "UPDATE patrol_sessions SET
                end_time = COALESCE($2, end_time),
                status = COALESCE($3, status),
                scans = COALESCE($4, scans),
                signature_data_url = CASE WHEN $5 THEN $6 ELSE signature_data_url END,
                updated_at = now()
             WHERE id = $1
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, PatrolSessionRow>(&query)
            .bind(id)
            .bind(update.end_time)
            .bind(update.status.map(|s| s.as_str()))
            .bind(update.scans.as_ref().map(Json))
            .bind(update.signature.is_some())
            .bind(update.signature.clone().flatten())
            .fetch_optional(pool)
            .await
    }
}
