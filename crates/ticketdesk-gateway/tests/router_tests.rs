// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-process router tests over a mock helpdesk and a temp cache.

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use serde_json::{Value, json};
use tower::ServiceExt;

use ticketdesk_core::StorageAdapter;
use ticketdesk_gateway::{GatewayState, build_router};
use ticketdesk_test_utils::{MockHelpdesk, TestHarness, fixtures};

fn router(harness: &TestHarness) -> Router {
    build_router(GatewayState::new(Arc::clone(&harness.orchestrator)))
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn webhook(body: impl Into<Body>) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/chatwoot-webhook")
        .header(header::CONTENT_TYPE, "application/json")
        .body(body.into())
        .unwrap()
}

#[tokio::test]
async fn ticket_history_cold_start_returns_listing() {
    let helpdesk = MockHelpdesk::new()
        .with_listing(vec![vec![
            fixtures::conversation(1, "open", 10),
            fixtures::conversation(2, "resolved", 20),
        ]])
        .with_messages(1, vec![fixtures::message(3, "preciso de ajuda", 5)]);
    let harness = TestHarness::with_helpdesk(helpdesk).await.unwrap();

    let (status, body) = send(router(&harness), get("/api/ticket-history?page=1&per_page=1")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalTicketsCount"], 2);
    assert_eq!(body["tickets"].as_array().unwrap().len(), 1);
    assert_eq!(body["tickets"][0]["id"], "2");
    assert_eq!(body["tickets"][0]["statusClass"], "status-resolved");
    assert_eq!(body["tickets"][0]["empresa"], "N/A");
    assert!(body["conversations"]["2"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn ticket_history_reports_sync_in_progress() {
    let helpdesk = MockHelpdesk::new()
        .with_listing(vec![vec![fixtures::conversation(1, "open", 10)]])
        .with_held_listing();
    let harness = TestHarness::with_helpdesk(helpdesk).await.unwrap();

    let first = tokio::spawn(send(router(&harness), get("/api/ticket-history")));
    harness.helpdesk.listing_started().await;

    let (status, body) = send(router(&harness), get("/api/ticket-history")).await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert!(body["message"].as_str().unwrap().contains("Sincronização"));

    harness.helpdesk.release_listing();
    let (status, body) = first.await.unwrap();
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalTicketsCount"], 1);
}

#[tokio::test]
async fn ticket_history_malformed_upstream_is_500() {
    let helpdesk = MockHelpdesk::new()
        .with_listing(vec![vec![fixtures::conversation(1, "open", 10)]])
        .with_malformed_messages(1);
    let harness = TestHarness::with_helpdesk(helpdesk).await.unwrap();

    let (status, body) = send(router(&harness), get("/api/ticket-history")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("malformed"));
}

#[tokio::test]
async fn ticket_history_ignores_malformed_paging() {
    let helpdesk =
        MockHelpdesk::new().with_listing(vec![vec![fixtures::conversation(1, "open", 10)]]);
    let harness = TestHarness::with_helpdesk(helpdesk).await.unwrap();

    let (status, body) = send(
        router(&harness),
        get("/api/ticket-history?page=abc&per_page=-3"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tickets"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn webhook_message_event_is_acknowledged_and_cached() {
    let helpdesk = MockHelpdesk::new().with_messages(42, vec![fixtures::message(7, "olá", 1)]);
    let harness = TestHarness::with_helpdesk(helpdesk).await.unwrap();

    let payload = json!({"event": "message_created", "id": 7, "conversation": {"id": 42}});
    let (status, body) = send(router(&harness), webhook(payload.to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok", "received": true}));
    let stored = harness.storage.get_conversation("42").await.unwrap().unwrap();
    assert_eq!(stored.len(), 1);
}

#[tokio::test]
async fn webhook_failures_and_unknown_events_are_still_acknowledged() {
    let helpdesk = MockHelpdesk::new()
        .with_conversation(fixtures::conversation(9, "open", 10))
        .with_malformed_messages(9);
    let harness = TestHarness::with_helpdesk(helpdesk).await.unwrap();

    for payload in [
        json!({"event": "conversation_updated", "id": 9}),
        json!({"event": "contact_created", "id": 1}),
        json!({"event": "webwidget_triggered"}),
        json!({"no_event": true}),
    ] {
        let (status, _) = send(router(&harness), webhook(payload.to_string())).await;
        assert_eq!(status, StatusCode::OK, "payload {payload}");
    }
}

#[tokio::test]
async fn webhook_rejects_non_json_body() {
    let harness = TestHarness::with_helpdesk(MockHelpdesk::new()).await.unwrap();

    let (status, body) = send(router(&harness), webhook("not json")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn health_reports_version_and_status() {
    let harness = TestHarness::with_helpdesk(MockHelpdesk::new()).await.unwrap();

    let (status, body) = send(router(&harness), get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["uptime_secs"].is_u64());
    assert_eq!(
        body["adapters"],
        json!([
            {"name": "sqlite", "version": "0.1.0", "kind": "Storage", "health": "healthy"},
            {"name": "mock-helpdesk", "version": "0.1.0", "kind": "Helpdesk", "health": "healthy"},
        ])
    );
}
