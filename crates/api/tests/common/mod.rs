#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use patrol_api::config::ServerConfig;
use patrol_api::registry::SessionRegistry;
use patrol_api::router::build_app_router;
use patrol_api::state::AppState;
use patrol_core::directory::Checkpoint;
use patrol_core::identifiers::OrgNode;
use patrol_engine::memory::MemoryStore;
use patrol_engine::{EngineConfig, PatrolEngine};
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        engine: EngineConfig {
            autosave_interval: Duration::from_secs(30),
            location_timeout: Duration::from_secs(5),
        },
    }
}

/// Seed the store with company `comp1` (custom id `ACME`), site `site1`,
/// area `area1` and three checkpoints `p1`, `p2`, `p3`.
pub async fn seeded_store() -> Arc<MemoryStore> {
    let store = Arc::new(MemoryStore::new());
    store
        .add_company(OrgNode::new("comp1", "Acme").with_custom_id("ACME"))
        .await;
    store.add_site(OrgNode::new("site1", "Downtown")).await;
    store.add_area(OrgNode::new("area1", "Lobby")).await;
    store.add_checkpoint(Checkpoint::new("p1", "Front door", "area1")).await;
    store.add_checkpoint(Checkpoint::new("p2", "Elevators", "area1")).await;
    store.add_checkpoint(Checkpoint::new("p3", "Loading dock", "area1")).await;
    store
}

/// Build the full application router over the given in-memory store.
///
/// Uses the same middleware stack as production via `build_app_router`.
pub fn build_test_app(store: Arc<MemoryStore>) -> Router {
    let config = test_config();
    let engine = PatrolEngine::new(store.clone(), store, config.engine.clone());

    let state = AppState {
        engine,
        registry: Arc::new(SessionRegistry::new()),
        config: Arc::new(config.clone()),
        pool: None,
    };

    build_app_router(state, &config)
}

/// The wire payload printed on checkpoint `id`'s label in the seeded area.
pub fn label(id: &str) -> String {
    format!(
        r#"{{"type":"patrol-point","pointId":"{id}","companyIdentifier":"ACME","siteIdentifier":"site1","areaIdentifier":"area1"}}"#
    )
}

/// Scan request body with a successful location fix.
pub fn scan_body(payload: &str) -> serde_json::Value {
    serde_json::json!({
        "payload": payload,
        "location": { "latitude": 40.7128, "longitude": -74.006 },
    })
}

pub fn start_body() -> serde_json::Value {
    serde_json::json!({
        "officerName": "J. Rivera",
        "companyId": "comp1",
        "siteId": "site1",
        "areaId": "area1",
        "shift": "Night",
    })
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn delete(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::DELETE)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn send_json(
    app: Router,
    method: Method,
    uri: &str,
    body: serde_json::Value,
) -> Response<Body> {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::POST, uri, body).await
}

pub async fn put_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send_json(app, Method::PUT, uri, body).await
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Start a session in the seeded area and return its id.
pub async fn start_patrol(app: &Router) -> String {
    let response = post_json(app.clone(), "/api/v1/patrols/start", start_body()).await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    let json = body_json(response).await;
    json["data"]["id"].as_str().unwrap().to_string()
}
