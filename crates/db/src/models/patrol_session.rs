//! Patrol session rows.
//!
//! `shift` and `status` are stored as their report strings and scans as a
//! JSONB array in report format, so rows read back into a
//! [`PatrolSession`] without any mapping tables.

use patrol_core::session::{PatrolSession, ScanRecord};
use patrol_core::store::StoreError;
use patrol_core::types::{EntityId, Timestamp};
use serde::Serialize;
use sqlx::types::Json;
use sqlx::FromRow;

/// A row from the `patrol_sessions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PatrolSessionRow {
    pub id: EntityId,
    pub officer_name: String,
    pub company_id: EntityId,
    pub site_id: EntityId,
    pub area_id: EntityId,
    pub start_time: Timestamp,
    pub end_time: Option<Timestamp>,
    pub shift: String,
    pub status: String,
    pub scans: Json<Vec<ScanRecord>>,
    pub signature_data_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl TryFrom<PatrolSessionRow> for PatrolSession {
    type Error = StoreError;

    fn try_from(row: PatrolSessionRow) -> Result<Self, Self::Error> {
        let shift = row
            .shift
            .parse()
            .map_err(|_| corrupt(&row.id, "shift", &row.shift))?;
        let status = row
            .status
            .parse()
            .map_err(|_| corrupt(&row.id, "status", &row.status))?;

        Ok(PatrolSession {
            id: row.id,
            officer_name: row.officer_name,
            company_id: row.company_id,
            site_id: row.site_id,
            area_id: row.area_id,
            start_time: row.start_time,
            end_time: row.end_time,
            shift,
            status,
            scans: row.scans.0,
            signature: row.signature_data_url,
        })
    }
}

fn corrupt(id: &str, column: &str, value: &str) -> StoreError {
    StoreError::Corrupt(format!(
        "patrol_sessions.{column} = '{value}' for session {id}"
    ))
}
