mod support;

use std::sync::Arc;

use axum::http::StatusCode;
use fitcoach_adapters::MemoryBackend;
use serde_json::json;
use support::{body_json, delete, get, post_json, router_with, send};

const COACH_A: Option<&str> = Some("token=coach-a");
const COACH_B: Option<&str> = Some("token=coach-b");

fn router() -> axum::Router {
    router_with(Arc::new(MemoryBackend::new()))
}

async fn open(app: &axum::Router, mode: serde_json::Value) -> u64 {
    let body = body_json(send(app, post_json("/api/drafts", &mode, COACH_A)).await).await;
    body["data"]["id"].as_u64().expect("draft id")
}

async fn change_field(app: &axum::Router, id: u64, name: &str, value: serde_json::Value) {
    send(
        app,
        post_json(
            &format!("/api/drafts/{id}/actions"),
            &json!({ "type": "CHANGE_FIELD_VALUE", "payload": { "name": name, "value": value } }),
            COACH_A,
        ),
    )
    .await;
}

#[tokio::test]
async fn field_changes_merge_into_the_draft() {
    let app = router();
    let id = open(&app, json!({ "mode": "new" })).await;

    for (name, value) in [("title", json!("Cut")), ("calories", json!(1800)), ("title", json!("Lean cut"))] {
        change_field(&app, id, name, value).await;
    }

    let body = body_json(send(&app, get(&format!("/api/drafts/{id}"), COACH_A)).await).await;
    assert_eq!(
        body["data"]["state"],
        json!({ "fields": { "calories": 1800, "title": "Lean cut" }, "stage": 1 })
    );
}

#[tokio::test]
async fn unknown_actions_change_nothing() {
    let app = router();
    let id = open(&app, json!({ "mode": "edit", "fields": { "title": "Week 1" } })).await;

    let response = send(
        &app,
        post_json(
            &format!("/api/drafts/{id}/actions"),
            &json!({ "type": "CHANGE_FEILD_VALUE", "payload": { "name": "title", "value": "x" } }),
            COACH_A,
        ),
    )
    .await;

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["state"]["fields"], json!({ "title": "Week 1" }));
}

#[tokio::test]
async fn advancing_requires_a_complete_stage() {
    let app = router();
    let id = open(
        &app,
        json!({ "mode": "edit", "fields": { "title": "", "description": "d", "file": "f" } }),
    )
    .await;
    let advance = json!({ "required": ["title", "description", "file"], "next_stage": 2 });
    let uri = format!("/api/drafts/{id}/advance");

    let body = body_json(send(&app, post_json(&uri, &advance, COACH_A)).await).await;
    assert_eq!(body["data"]["check"], json!({ "success": false, "field": "title" }));
    assert_eq!(body["data"]["state"]["stage"], 1);

    change_field(&app, id, "title", json!("t")).await;

    let body = body_json(send(&app, post_json(&uri, &advance, COACH_A)).await).await;
    assert_eq!(body["data"]["check"], json!({ "success": true }));
    assert_eq!(body["data"]["state"]["stage"], 2);
}

#[tokio::test]
async fn legacy_presence_treats_zero_as_missing() {
    let app = router();
    let id = open(&app, json!({ "mode": "edit", "fields": { "sets": 0 } })).await;
    let uri = format!("/api/drafts/{id}/advance");

    let explicit = json!({ "required": ["sets"], "next_stage": 2 });
    let body = body_json(send(&app, post_json(&uri, &explicit, COACH_A)).await).await;
    assert_eq!(body["data"]["check"], json!({ "success": true }));

    let truthy = json!({ "required": ["sets"], "next_stage": 3, "presence": "truthy" });
    let body = body_json(send(&app, post_json(&uri, &truthy, COACH_A)).await).await;
    assert_eq!(body["data"]["check"], json!({ "success": false, "field": "sets" }));
    assert_eq!(body["data"]["state"]["stage"], 2);
}

#[tokio::test]
async fn closed_drafts_are_gone() {
    let app = router();
    let id = open(&app, json!({ "mode": "new" })).await;
    let uri = format!("/api/drafts/{id}");

    let response = send(&app, delete(&uri, COACH_A)).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = send(&app, get(&uri, COACH_A)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_json(response).await["status_code"], 404);

    let response = send(&app, delete(&uri, COACH_A)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn drafts_of_another_session_are_not_found() {
    let app = router();
    let id = open(&app, json!({ "mode": "edit", "fields": { "email": "coach-a@x" } })).await;
    let uri = format!("/api/drafts/{id}");

    let response = send(&app, get(&uri, COACH_B)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["status_code"], 404);
    assert!(body.get("data").is_none());

    let response = send(
        &app,
        post_json(
            &format!("{uri}/actions"),
            &json!({ "type": "CHANGE_FIELD_VALUE", "payload": { "name": "email", "value": "b@x" } }),
            COACH_B,
        ),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = send(&app, delete(&uri, COACH_B)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let body = body_json(send(&app, get(&uri, COACH_A)).await).await;
    assert_eq!(body["data"]["state"]["fields"], json!({ "email": "coach-a@x" }));
}

#[tokio::test]
async fn drafts_require_a_session() {
    let app = router();
    let id = open(&app, json!({ "mode": "new" })).await;

    let response = send(&app, post_json("/api/drafts", &json!({ "mode": "new" }), None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, get(&format!("/api/drafts/{id}"), None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["status_code"], 401);

    let response = send(&app, delete(&format!("/api/drafts/{id}"), None)).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = send(&app, get(&format!("/api/drafts/{id}"), COACH_A)).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn logout_closes_the_sessions_drafts() {
    let app = router();
    let id = open(&app, json!({ "mode": "new" })).await;

    send(&app, post_json("/api/logout", &json!({}), COACH_A)).await;

    let response = send(&app, get(&format!("/api/drafts/{id}"), COACH_A)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn malformed_draft_requests_are_rejected() {
    let app = router();

    let response = send(&app, post_json("/api/drafts", &json!({ "mode": "copy" }), COACH_A)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = send(&app, get("/api/drafts/not-a-number", COACH_A)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}
