//! Route definitions for the `/checkpoints` resource.

use axum::routing::get;
use axum::Router;

use crate::handlers::checkpoints;
use crate::state::AppState;

/// Routes mounted at `/checkpoints`.
///
/// ```text
/// GET /{id}/payload   -> get_payload  (?companyId=..&siteId=..)
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route("/{id}/payload", get(checkpoints::get_payload))
}
