//! Handlers for patrol sessions.
//!
//! Active sessions live in the [`SessionRegistry`](crate::registry::SessionRegistry).
//! An in-progress session that is not registered (for example after a
//! restart) is resumed from the store on first use.

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::Json;
use patrol_core::coverage::{coverage, Coverage};
use patrol_core::directory::load_snapshot;
use patrol_core::error::CoreError;
use patrol_core::location::{GeoPoint, LocationError, ReportedLocation};
use patrol_core::session::{PatrolSession, ScanRecord, StartSession};
use patrol_core::validation::RejectionReason;
use patrol_engine::ScanError;
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::{AppError, AppResult};
use crate::registry::SharedPatrol;
use crate::response::DataResponse;
use crate::state::AppState;

/// Find the active patrol for `id`, resuming it from the store if needed.
///
/// Fails with 404 for unknown ids and `SessionClosed` for submitted ones.
async fn active_patrol(state: &AppState, id: &str) -> AppResult<SharedPatrol> {
    if let Some(patrol) = state.registry.get(id).await {
        return Ok(patrol);
    }

    let stored = state
        .engine
        .store()
        .find_session(id)
        .await?
        .ok_or_else(|| not_found(id))?;
    if !stored.is_in_progress() {
        return Err(AppError::SessionClosed(stored.id));
    }

    let patrol = state.engine.resume(stored).await?;
    Ok(state.registry.insert(patrol).await)
}

fn not_found(id: &str) -> AppError {
    AppError::Core(CoreError::NotFound {
        entity: "PatrolSession",
        id: id.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Start / list / get
// ---------------------------------------------------------------------------

/// POST /api/v1/patrols/start
///
/// Start a session. Returns 201 with the new in-progress session.
pub async fn start_patrol(
    State(state): State<AppState>,
    Json(input): Json<StartSession>,
) -> AppResult<impl IntoResponse> {
    let patrol = state.engine.start(&input).await?;
    let session = PatrolSession::clone(&patrol.session());
    state.registry.insert(patrol).await;

    Ok((StatusCode::CREATED, Json(DataResponse { data: session })))
}

/// GET /api/v1/patrols
///
/// List stored sessions, most recently started first.
pub async fn list_patrols(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
    let sessions = state.engine.store().list_sessions().await?;
    Ok(Json(DataResponse { data: sessions }))
}

/// GET /api/v1/patrols/{id}
///
/// The live record of an active session, otherwise the stored one.
pub async fn get_patrol(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    if let Some(patrol) = state.registry.get(&id).await {
        let session = PatrolSession::clone(&patrol.lock().await.session());
        return Ok(Json(DataResponse { data: session }));
    }

    let session = state
        .engine
        .store()
        .find_session(&id)
        .await?
        .ok_or_else(|| not_found(&id))?;
    Ok(Json(DataResponse { data: session }))
}

// ---------------------------------------------------------------------------
// Scans
// ---------------------------------------------------------------------------

/// Request body for `POST /patrols/{id}/scans`.
///
/// `location` is the device's position fix for this scan; when the device
/// could not get one it sends `locationError` instead.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanInput {
    /// Decoded label text, passed to validation untouched.
    pub payload: String,
    pub location: Option<GeoPoint>,
    pub location_error: Option<LocationError>,
}

impl ScanInput {
    fn provider(&self) -> ReportedLocation {
        match (self.location, self.location_error) {
            (Some(point), _) => ReportedLocation(Ok(point)),
            (None, Some(e)) => ReportedLocation(Err(e)),
            (None, None) => ReportedLocation(Err(LocationError::PositionUnavailable)),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanOutcome {
    Recorded {
        scan: ScanRecord,
    },
    #[serde(rename_all = "camelCase")]
    AlreadyScanned {
        checkpoint_name: String,
        message: String,
    },
}

/// POST /api/v1/patrols/{id}/scans
///
/// Validate a decoded label and record it. A repeat scan is answered with
/// 200 and `outcome: "already_scanned"`; every other rejection is a 422
/// carrying the rejection code.
pub async fn record_scan(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<ScanInput>,
) -> AppResult<impl IntoResponse> {
    let patrol = active_patrol(&state, &id).await?;
    let mut patrol = patrol.lock().await;

    // Dropping this future (client disconnect) abandons the scan before
    // anything is appended, so the token is only for explicit cancellation.
    let cancel = CancellationToken::new();
    let outcome = match patrol
        .record_scan(&input.payload, &input.provider(), &cancel)
        .await
    {
        Ok(scan) => ScanOutcome::Recorded { scan },
        Err(ScanError::Rejected(RejectionReason::AlreadyScanned { checkpoint_name })) => {
            let message = RejectionReason::AlreadyScanned {
                checkpoint_name: checkpoint_name.clone(),
            }
            .to_string();
            ScanOutcome::AlreadyScanned {
                checkpoint_name,
                message,
            }
        }
        Err(e) => return Err(e.into()),
    };

    Ok(Json(DataResponse { data: outcome }))
}

// ---------------------------------------------------------------------------
// Signature / coverage
// ---------------------------------------------------------------------------

/// Request body for `PUT /patrols/{id}/signature`. An empty string clears
/// the signature.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignatureInput {
    pub signature_data_url: String,
}

/// PUT /api/v1/patrols/{id}/signature
pub async fn update_signature(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(input): Json<SignatureInput>,
) -> AppResult<impl IntoResponse> {
    let patrol = active_patrol(&state, &id).await?;
    let mut patrol = patrol.lock().await;
    patrol.update_signature(&input.signature_data_url)?;

    let session = PatrolSession::clone(&patrol.session());
    Ok(Json(DataResponse { data: session }))
}

/// GET /api/v1/patrols/{id}/coverage
///
/// Works for active and stored sessions alike. Stored ones are counted
/// against the area's current checkpoints, but a submitted session keeps
/// the status it was submitted with.
pub async fn get_coverage(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    if let Some(patrol) = state.registry.get(&id).await {
        let result = patrol.lock().await.coverage();
        return Ok(Json(DataResponse { data: result }));
    }

    let session = state
        .engine
        .store()
        .find_session(&id)
        .await?
        .ok_or_else(|| not_found(&id))?;
    let snapshot = load_snapshot(
        state.engine.directory().as_ref(),
        &session.company_id,
        &session.site_id,
        &session.area_id,
    )
    .await?;
    let mut result = coverage(&session, snapshot.total_checkpoints());
    if session.status.is_terminal() {
        result.status = session.status;
    }
    Ok(Json(DataResponse { data: result }))
}

// ---------------------------------------------------------------------------
// Submit / discard
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub session: PatrolSession,
    pub coverage: Coverage,
}

/// POST /api/v1/patrols/{id}/submit
///
/// Requires a signature. On success the session leaves the registry; on a
/// storage failure it stays active and the request can be retried.
pub async fn submit_patrol(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let shared = active_patrol(&state, &id).await?;
    let mut patrol = shared.lock().await;

    if !patrol.session().is_signed() {
        return Err(AppError::SignatureRequired);
    }

    let (session, coverage) = patrol.submit().await?;
    drop(patrol);
    state.registry.remove(&id).await;

    Ok(Json(DataResponse {
        data: SubmitResponse { session, coverage },
    }))
}

/// DELETE /api/v1/patrols/{id}
///
/// Release an active session without submitting it. Its current state is
/// written first, so the stored record stays in progress with every scan.
pub async fn discard_patrol(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> AppResult<impl IntoResponse> {
    let shared = state
        .registry
        .remove(&id)
        .await
        .ok_or_else(|| not_found(&id))?;

    match Arc::try_unwrap(shared) {
        Ok(patrol) => {
            patrol.into_inner().discard().await;
        }
        // Another request still holds the patrol. Save once it is done; the
        // last holder drops it, which cancels its autosave.
        Err(shared) => {
            let patrol = shared.lock().await;
            if let Err(e) = patrol.save_progress().await {
                tracing::warn!(session_id = %id, error = %e, "Failed to save discarded patrol");
            }
        }
    }

    Ok(StatusCode::NO_CONTENT)
}
