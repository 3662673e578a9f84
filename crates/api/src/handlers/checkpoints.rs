//! Label payloads for printing checkpoint codes.

use axum::extract::{Path, Query, State};
use axum::response::IntoResponse;
use axum::Json;
use patrol_core::directory::Directory;
use patrol_core::error::CoreError;
use patrol_core::identifiers::OrgNode;
use patrol_core::payload::ScanPayload;
use patrol_core::store::StoreError;
use serde::{Deserialize, Serialize};

use crate::error::AppResult;
use crate::response::DataResponse;
use crate::state::AppState;

/// Query parameters for `GET /checkpoints/{id}/payload`.
///
/// The checkpoint determines the area; company and site are named
/// explicitly because the directory only links checkpoints to areas.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayloadQuery {
    pub company_id: String,
    pub site_id: String,
}

#[derive(Debug, Serialize)]
pub struct PayloadResponse {
    /// The structured payload.
    pub payload: ScanPayload,
    /// Exact text to encode on the label.
    pub wire: String,
}

async fn require(
    lookup: impl std::future::Future<Output = Result<Option<OrgNode>, StoreError>>,
    entity: &'static str,
    id: &str,
) -> AppResult<OrgNode> {
    lookup.await?.ok_or_else(|| {
        CoreError::NotFound {
            entity,
            id: id.to_string(),
        }
        .into()
    })
}

/// GET /api/v1/checkpoints/{id}/payload
///
/// Build the payload printed on a checkpoint's label, using the resolved
/// external identifiers of its company, site and area.
pub async fn get_payload(
    State(state): State<AppState>,
    Path(checkpoint_id): Path<String>,
    Query(query): Query<PayloadQuery>,
) -> AppResult<impl IntoResponse> {
    let directory: &dyn Directory = state.engine.directory().as_ref();

    let checkpoint = directory
        .checkpoint(&checkpoint_id)
        .await?
        .ok_or_else(|| CoreError::NotFound {
            entity: "Checkpoint",
            id: checkpoint_id.clone(),
        })?;
    let company = require(directory.company(&query.company_id), "Company", &query.company_id).await?;
    let site = require(directory.site(&query.site_id), "Site", &query.site_id).await?;
    let area = require(directory.area(&checkpoint.area_id), "Area", &checkpoint.area_id).await?;

    let payload = ScanPayload::for_checkpoint(&company, &site, &area, &checkpoint);
    let wire = payload.to_wire();
    tracing::debug!(checkpoint_id = %checkpoint_id, "Built label payload");

    Ok(Json(DataResponse {
        data: PayloadResponse { payload, wire },
    }))
}
