// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! End-to-end tests: HTTP router, orchestrator, SQLite cache and the real
//! Chatwoot client against a mock Chatwoot server.
//!
//! Each test starts its own mock server and temp database.

use std::sync::Arc;

use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;
use wiremock::matchers::{header, method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ticketdesk_chatwoot::ChatwootClient;
use ticketdesk_config::model::{ChatwootConfig, StorageConfig, SyncConfig};
use ticketdesk_core::StorageAdapter;
use ticketdesk_gateway::{GatewayState, build_router};
use ticketdesk_storage::SqliteStorage;
use ticketdesk_sync::SyncOrchestrator;

const ACCOUNT: &str = "/api/v1/accounts/7";

struct Stack {
    router: axum::Router,
    storage: Arc<SqliteStorage>,
    _dir: tempfile::TempDir,
}

async fn stack(server: &MockServer) -> Stack {
    let dir = tempfile::tempdir().unwrap();
    let storage = Arc::new(SqliteStorage::new(StorageConfig {
        database_path: dir.path().join("tickets.db").to_string_lossy().into_owned(),
        wal_mode: true,
    }));
    storage.initialize().await.unwrap();

    let client = Arc::new(
        ChatwootClient::new(&ChatwootConfig {
            base_url: Some(server.uri()),
            account_id: Some("7".into()),
            api_token: Some("secret-token".into()),
            request_timeout_secs: 5,
        })
        .unwrap(),
    );
    let orchestrator = Arc::new(SyncOrchestrator::new(
        storage.clone(),
        client,
        SyncConfig::default(),
    ));

    Stack {
        router: build_router(GatewayState::new(orchestrator)),
        storage,
        _dir: dir,
    }
}

fn conversation(id: i64, status: &str, last_activity_at: i64) -> Value {
    json!({
        "id": id,
        "status": status,
        "created_at": 1_709_251_200,
        "last_activity_at": last_activity_at,
        "labels": [],
        "custom_attributes": {"problema": format!("Pedido {id} atrasado")},
        "messages": [],
        "meta": {
            "sender": {"id": 300 + id, "name": "Maria", "additional_attributes": {"company_name": "Loja da Maria"}},
            "assignee": {"id": 2, "name": "Ana"},
            "inbox": {"id": 1, "name": "WhatsApp"}
        }
    })
}

fn message(id: i64, content: &str, message_type: u8) -> Value {
    json!({
        "id": id,
        "content": content,
        "created_at": 1_709_251_200 + id,
        "message_type": message_type,
        "private": false,
        "sender": {"id": 1, "name": if message_type == 0 { "Maria" } else { "Ana" }}
    })
}

async fn mount_listing(server: &MockServer, page: &str, conversations: Vec<Value>, all_count: u64) {
    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNT}/conversations")))
        .and(query_param("page", page))
        .and(header("api_access_token", "secret-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {"meta": {"all_count": all_count}, "payload": conversations}
        })))
        .mount(server)
        .await;
}

async fn mount_messages(server: &MockServer, conversation_id: i64, messages: Vec<Value>) {
    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNT}/conversations/{conversation_id}/messages")))
        .and(query_param_is_missing("before"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "payload": messages })))
        .mount(server)
        .await;
}

async fn call(router: &axum::Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

#[tokio::test]
async fn cold_start_then_webhook_update() {
    let server = MockServer::start().await;
    mount_listing(
        &server,
        "1",
        vec![conversation(10, "open", 500), conversation(11, "pending", 400)],
        2,
    )
    .await;
    mount_listing(&server, "2", vec![], 2).await;
    mount_messages(
        &server,
        10,
        vec![message(2, "Já verifico", 1), message(1, "Meu pedido não chegou", 0)],
    )
    .await;
    mount_messages(&server, 11, vec![]).await;

    let stack = stack(&server).await;

    let (status, body) = call(
        &stack.router,
        Request::get("/api/ticket-history").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalTicketsCount"], 2);
    assert_eq!(body["tickets"][0]["id"], "10");
    assert_eq!(body["tickets"][0]["assunto"], "Pedido 10 atrasado");
    assert_eq!(body["tickets"][0]["type"], "WhatsApp");
    assert_eq!(body["tickets"][1]["status"], "Pendente");
    let history = body["conversations"]["10"].as_array().unwrap();
    assert_eq!(history.len(), 2);
    assert_eq!(history[0]["sender"], "Maria (Cliente)");
    assert_eq!(history[1]["sender"], "Ana (Agente)");

    // Upstream resolves conversation 10 and pushes a webhook.
    let resolved = conversation(10, "resolved", 900);
    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNT}/conversations/10")))
        .respond_with(ResponseTemplate::new(200).set_body_json(resolved))
        .mount(&server)
        .await;

    let (status, body) = call(
        &stack.router,
        Request::post("/api/chatwoot-webhook")
            .header("content-type", "application/json")
            .body(Body::from(
                json!({"event": "conversation_status_changed", "id": 10}).to_string(),
            ))
            .unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["received"], true);

    let ticket = stack.storage.get_ticket("10").await.unwrap().unwrap();
    assert_eq!(ticket.status, "Resolvido");
    assert_eq!(ticket.last_activity_at, 900);
}

#[tokio::test]
async fn upstream_outage_serves_empty_listing() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNT}/conversations")))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let stack = stack(&server).await;
    let (status, body) = call(
        &stack.router,
        Request::get("/api/ticket-history").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["tickets"], json!([]));
    assert_eq!(body["totalTicketsCount"], 0);
}

#[tokio::test]
async fn malformed_listing_is_reported_as_500() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(format!("{ACCOUNT}/conversations")))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": {"payload": "oops"}})))
        .mount(&server)
        .await;

    let stack = stack(&server).await;
    let (status, body) = call(
        &stack.router,
        Request::get("/api/ticket-history").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["error"].as_str().unwrap().contains("data.payload"));
    assert_eq!(stack.storage.count_tickets().await.unwrap(), 0);
}
