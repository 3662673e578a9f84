//! Route definitions for the `/patrols` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::patrols;
use crate::state::AppState;

/// Routes mounted at `/patrols`.
///
/// ```text
/// GET    /                 -> list_patrols
/// POST   /start            -> start_patrol
/// GET    /{id}             -> get_patrol
/// DELETE /{id}             -> discard_patrol
/// POST   /{id}/scans       -> record_scan
/// PUT    /{id}/signature   -> update_signature
/// GET    /{id}/coverage    -> get_coverage
/// POST   /{id}/submit      -> submit_patrol
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(patrols::list_patrols))
        .route("/start", post(patrols::start_patrol))
        .route(
            "/{id}",
            get(patrols::get_patrol).delete(patrols::discard_patrol),
        )
        .route("/{id}/scans", post(patrols::record_scan))
        .route("/{id}/signature", put(patrols::update_signature))
        .route("/{id}/coverage", get(patrols::get_coverage))
        .route("/{id}/submit", post(patrols::submit_patrol))
}
