pub mod checkpoints;
pub mod health;
pub mod patrols;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// ```text
/// /patrols                          list stored sessions
/// /patrols/start                    start a session (POST)
/// /patrols/{id}                     get, discard (DELETE)
/// /patrols/{id}/scans               record a scan (POST)
/// /patrols/{id}/signature           set or clear the signature (PUT)
/// /patrols/{id}/coverage            progress (GET)
/// /patrols/{id}/submit              submit (POST)
///
/// /checkpoints/{id}/payload         label payload (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/patrols", patrols::router())
        .nest("/checkpoints", checkpoints::router())
}
