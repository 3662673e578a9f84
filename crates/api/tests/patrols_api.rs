//! Integration tests for the `/api/v1/patrols` and `/api/v1/checkpoints`
//! endpoints, backed by the in-memory store.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, build_test_app, delete, get, label, post_json, put_json, scan_body, seeded_store,
    start_body, start_patrol,
};
use patrol_core::directory::Checkpoint;
use patrol_core::session::PatrolStatus;
use patrol_core::store::SessionStore;

// ---------------------------------------------------------------------------
// Start
// ---------------------------------------------------------------------------

#[tokio::test]
async fn start_returns_in_progress_session() {
    let app = build_test_app(seeded_store().await);
    let response = post_json(app, "/api/v1/patrols/start", start_body()).await;

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["status"], "In Progress");
    assert_eq!(json["data"]["officerName"], "J. Rivera");
    assert_eq!(json["data"]["shift"], "Night");
    assert_eq!(json["data"]["scans"].as_array().unwrap().len(), 0);
    assert!(json["data"]["id"].is_string());
}

#[tokio::test]
async fn start_with_blank_officer_is_validation_error() {
    let store = seeded_store().await;
    let app = build_test_app(store.clone());
    let mut body = start_body();
    body["officerName"] = "   ".into();

    let response = post_json(app, "/api/v1/patrols/start", body).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert!(store.list_sessions().await.unwrap().is_empty());
}

#[tokio::test]
async fn start_with_unknown_site_is_not_found() {
    let app = build_test_app(seeded_store().await);
    let mut body = start_body();
    body["siteId"] = "nowhere".into();

    let response = post_json(app, "/api/v1/patrols/start", body).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let json = body_json(response).await;
    assert_eq!(json["error"], "Site with id nowhere not found");
}

// ---------------------------------------------------------------------------
// Scans
// ---------------------------------------------------------------------------

#[tokio::test]
async fn accepted_scan_is_recorded() {
    let app = build_test_app(seeded_store().await);
    let id = start_patrol(&app).await;

    let uri = format!("/api/v1/patrols/{id}/scans");
    let response = post_json(app.clone(), &uri, scan_body(&label("p2"))).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["outcome"], "recorded");
    assert_eq!(json["data"]["scan"]["pointId"], "p2");
    assert_eq!(json["data"]["scan"]["pointName"], "Elevators");
    assert_eq!(json["data"]["scan"]["location"]["latitude"], 40.7128);

    let json = body_json(get(app, &format!("/api/v1/patrols/{id}")).await).await;
    assert_eq!(json["data"]["scans"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn repeat_scan_reports_already_scanned() {
    let app = build_test_app(seeded_store().await);
    let id = start_patrol(&app).await;
    let uri = format!("/api/v1/patrols/{id}/scans");

    post_json(app.clone(), &uri, scan_body(&label("p1"))).await;
    let response = post_json(app.clone(), &uri, scan_body(&label("p1"))).await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["outcome"], "already_scanned");
    assert_eq!(json["data"]["checkpointName"], "Front door");
    assert_eq!(json["data"]["message"], "Front door has already been scanned.");

    let json = body_json(get(app, &format!("/api/v1/patrols/{id}")).await).await;
    assert_eq!(json["data"]["scans"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn foreign_payload_is_rejected_with_code() {
    let app = build_test_app(seeded_store().await);
    let id = start_patrol(&app).await;
    let uri = format!("/api/v1/patrols/{id}/scans");

    let response = post_json(app.clone(), &uri, scan_body(r#"{"type":"other"}"#)).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "UNRECOGNIZED_PAYLOAD");
    assert_eq!(json["error"], "Invalid or unrecognized QR code.");

    let response = post_json(app, &uri, scan_body("not json")).await;
    let json = body_json(response).await;
    assert_eq!(json["code"], "MALFORMED_PAYLOAD");
}

#[tokio::test]
async fn wrong_company_label_is_rejected() {
    let app = build_test_app(seeded_store().await);
    let id = start_patrol(&app).await;

    // Internal key instead of the company's custom identifier.
    let payload = r#"{"type":"patrol-point","pointId":"p1","companyIdentifier":"comp1","siteIdentifier":"site1","areaIdentifier":"area1"}"#;
    let response = post_json(
        app,
        &format!("/api/v1/patrols/{id}/scans"),
        scan_body(payload),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["code"], "WRONG_COMPANY");
}

#[tokio::test]
async fn location_failure_aborts_scan() {
    let app = build_test_app(seeded_store().await);
    let id = start_patrol(&app).await;

    let body = serde_json::json!({
        "payload": label("p1"),
        "locationError": "PermissionDenied",
    });
    let response = post_json(app.clone(), &format!("/api/v1/patrols/{id}/scans"), body).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "LOCATION_PERMISSION_DENIED");

    let json = body_json(get(app, &format!("/api/v1/patrols/{id}")).await).await;
    assert!(json["data"]["scans"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn scan_for_unknown_session_is_not_found() {
    let app = build_test_app(seeded_store().await);
    let response = post_json(app, "/api/v1/patrols/missing/scans", scan_body(&label("p1"))).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Coverage, signature, submit
// ---------------------------------------------------------------------------

#[tokio::test]
async fn coverage_tracks_progress() {
    let app = build_test_app(seeded_store().await);
    let id = start_patrol(&app).await;
    post_json(
        app.clone(),
        &format!("/api/v1/patrols/{id}/scans"),
        scan_body(&label("p3")),
    )
    .await;

    let response = get(app, &format!("/api/v1/patrols/{id}/coverage")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["uniqueScanned"], 1);
    assert_eq!(json["data"]["total"], 3);
    assert_eq!(json["data"]["status"], "Missed Points");
}

#[tokio::test]
async fn submit_requires_signature() {
    let app = build_test_app(seeded_store().await);
    let id = start_patrol(&app).await;

    let response = post_json(
        app,
        &format!("/api/v1/patrols/{id}/submit"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = body_json(response).await;
    assert_eq!(json["code"], "SIGNATURE_REQUIRED");
}

#[tokio::test]
async fn partial_patrol_submits_as_missed_points() {
    let store = seeded_store().await;
    let app = build_test_app(store.clone());
    let id = start_patrol(&app).await;
    let scans = format!("/api/v1/patrols/{id}/scans");

    post_json(app.clone(), &scans, scan_body(&label("p1"))).await;
    post_json(app.clone(), &scans, scan_body(&label("p2"))).await;
    let response = put_json(
        app.clone(),
        &format!("/api/v1/patrols/{id}/signature"),
        serde_json::json!({ "signatureDataUrl": "data:image/png;base64,AAAA" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        app.clone(),
        &format!("/api/v1/patrols/{id}/submit"),
        serde_json::json!({}),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["session"]["status"], "Missed Points");
    assert_eq!(json["data"]["coverage"]["uniqueScanned"], 2);
    let percent = json["data"]["coverage"]["percent"].as_f64().unwrap();
    assert!((percent - 66.67).abs() < 0.01);

    let stored = store.find_session(&id).await.unwrap().unwrap();
    assert_eq!(stored.status, PatrolStatus::MissedPoints);
    assert!(stored.end_time.is_some());

    // The submitted session is read-only from here on.
    let response = post_json(app.clone(), &scans, scan_body(&label("p3"))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "SESSION_CLOSED");

    let json = body_json(get(app.clone(), &format!("/api/v1/patrols/{id}")).await).await;
    assert_eq!(json["data"]["status"], "Missed Points");

    let json = body_json(get(app, "/api/v1/patrols").await).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn full_patrol_submits_as_completed() {
    let app = build_test_app(seeded_store().await);
    let id = start_patrol(&app).await;
    let scans = format!("/api/v1/patrols/{id}/scans");
    for point in ["p1", "p2", "p3"] {
        post_json(app.clone(), &scans, scan_body(&label(point))).await;
    }
    put_json(
        app.clone(),
        &format!("/api/v1/patrols/{id}/signature"),
        serde_json::json!({ "signatureDataUrl": "sig" }),
    )
    .await;

    let response = post_json(
        app,
        &format!("/api/v1/patrols/{id}/submit"),
        serde_json::json!({}),
    )
    .await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["session"]["status"], "Completed");
    assert_eq!(json["data"]["coverage"]["percent"], 100.0);
}

#[tokio::test]
async fn submitted_coverage_keeps_stored_status() {
    let store = seeded_store().await;
    let app = build_test_app(store.clone());
    let id = start_patrol(&app).await;
    let scans = format!("/api/v1/patrols/{id}/scans");
    for point in ["p1", "p2", "p3"] {
        post_json(app.clone(), &scans, scan_body(&label(point))).await;
    }
    put_json(
        app.clone(),
        &format!("/api/v1/patrols/{id}/signature"),
        serde_json::json!({ "signatureDataUrl": "sig" }),
    )
    .await;
    post_json(
        app.clone(),
        &format!("/api/v1/patrols/{id}/submit"),
        serde_json::json!({}),
    )
    .await;

    // The area grows after submission.
    store
        .add_checkpoint(Checkpoint::new("p4", "Roof access", "area1"))
        .await;

    let json = body_json(get(app, &format!("/api/v1/patrols/{id}/coverage")).await).await;
    assert_eq!(json["data"]["total"], 4);
    assert_eq!(json["data"]["uniqueScanned"], 3);
    assert_eq!(json["data"]["status"], "Completed");
}

// ---------------------------------------------------------------------------
// Discard and resume
// ---------------------------------------------------------------------------

#[tokio::test]
async fn discarded_patrol_resumes_from_store() {
    let store = seeded_store().await;
    let app = build_test_app(store.clone());
    let id = start_patrol(&app).await;

    let response = delete(app.clone(), &format!("/api/v1/patrols/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = delete(app.clone(), &format!("/api/v1/patrols/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    // Still in progress in the store, so the next scan picks it back up.
    let response = post_json(
        app,
        &format!("/api/v1/patrols/{id}/scans"),
        scan_body(&label("p1")),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn discard_keeps_recorded_scans() {
    let store = seeded_store().await;
    let app = build_test_app(store.clone());
    let id = start_patrol(&app).await;
    let scans = format!("/api/v1/patrols/{id}/scans");

    let json = body_json(post_json(app.clone(), &scans, scan_body(&label("p1"))).await).await;
    assert_eq!(json["data"]["outcome"], "recorded");

    let response = delete(app.clone(), &format!("/api/v1/patrols/{id}")).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let stored = store.find_session(&id).await.unwrap().unwrap();
    assert_eq!(stored.scans.len(), 1);

    let json = body_json(get(app.clone(), &format!("/api/v1/patrols/{id}")).await).await;
    assert_eq!(json["data"]["scans"].as_array().unwrap().len(), 1);

    // Resumed from the store, the checkpoint is still counted.
    let json = body_json(post_json(app, &scans, scan_body(&label("p1"))).await).await;
    assert_eq!(json["data"]["outcome"], "already_scanned");
}

// ---------------------------------------------------------------------------
// Checkpoint payloads
// ---------------------------------------------------------------------------

#[tokio::test]
async fn payload_endpoint_returns_exact_wire_text() {
    let app = build_test_app(seeded_store().await);
    let response = get(
        app,
        "/api/v1/checkpoints/p2/payload?companyId=comp1&siteId=site1",
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["wire"], label("p2"));
    assert_eq!(json["data"]["payload"]["companyIdentifier"], "ACME");
}

#[tokio::test]
async fn payload_for_unknown_checkpoint_is_not_found() {
    let app = build_test_app(seeded_store().await);
    let response = get(
        app,
        "/api/v1/checkpoints/nope/payload?companyId=comp1&siteId=site1",
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
