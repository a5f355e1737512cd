// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP request handlers.
//!
//! Handles POST /api/chatwoot-webhook, GET /api/ticket-history and GET /health.

use axum::{
    Json,
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::Value;

use ticketdesk_core::{HealthStatus, PluginAdapter};
use ticketdesk_sync::{ListingOutcome, ListingQuery, WebhookEvent};

use crate::server::GatewayState;

/// Message returned with 202 while a cold-start sync is running.
pub const SYNC_IN_PROGRESS_MESSAGE: &str =
    "Sincronização em andamento. Tente novamente em alguns instantes.";

/// Response body for POST /api/chatwoot-webhook.
#[derive(Debug, Serialize)]
pub struct WebhookAck {
    pub status: &'static str,
    pub received: bool,
}

/// Response body for GET /health.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// "ok", or "degraded" when the cache store reports a problem.
    pub status: String,
    /// Binary version.
    pub version: String,
    pub uptime_secs: u64,
    /// Cache store first, then the upstream helpdesk.
    pub adapters: Vec<AdapterReport>,
}

/// Identity and health of one adapter, as listed by GET /health.
#[derive(Debug, Serialize)]
pub struct AdapterReport {
    pub name: String,
    pub version: String,
    pub kind: String,
    /// "healthy", "degraded: ..." or "unhealthy: ...".
    pub health: String,
}

impl AdapterReport {
    async fn collect<A: PluginAdapter + ?Sized>(adapter: &A) -> (Self, bool) {
        let (health, healthy) = match adapter.health_check().await {
            Ok(HealthStatus::Healthy) => ("healthy".to_string(), true),
            Ok(HealthStatus::Degraded(reason)) => (format!("degraded: {reason}"), false),
            Ok(HealthStatus::Unhealthy(reason)) => (format!("unhealthy: {reason}"), false),
            Err(e) => (format!("unhealthy: {e}"), false),
        };
        if !healthy {
            tracing::warn!(adapter = adapter.name(), %health, "adapter is not healthy");
        }
        let report = Self {
            name: adapter.name().to_string(),
            version: adapter.version().to_string(),
            kind: adapter.adapter_type().to_string(),
            health,
        };
        (report, healthy)
    }
}

/// 202 body.
#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    /// Error description.
    pub error: String,
}

fn error_response(status: StatusCode, error: impl Into<String>) -> Response {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
        .into_response()
}

/// POST /api/chatwoot-webhook
///
/// Classifies the event and applies it before acknowledging. Per-event
/// refresh failures are logged and still acknowledged; only a body that is
/// not JSON is answered with 500.
pub async fn post_webhook(State(state): State<GatewayState>, body: Bytes) -> Response {
    let payload: Value = match serde_json::from_slice(&body) {
        Ok(payload) => payload,
        Err(e) => {
            tracing::error!(error = %e, "webhook body is not valid JSON");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error");
        }
    };

    let event = WebhookEvent::from_payload(&payload);
    tracing::debug!(?event, "webhook received");
    event.apply(&state.orchestrator).await;

    (
        StatusCode::OK,
        Json(WebhookAck {
            status: "ok",
            received: true,
        }),
    )
        .into_response()
}

/// GET /api/ticket-history?page&per_page&contactId
pub async fn get_ticket_history(
    State(state): State<GatewayState>,
    Query(query): Query<ListingQuery>,
) -> Response {
    match state.orchestrator.ticket_listing(&query).await {
        Ok(ListingOutcome::Ready(listing)) => (StatusCode::OK, Json(listing)).into_response(),
        Ok(ListingOutcome::SyncInProgress) => (
            StatusCode::ACCEPTED,
            Json(MessageResponse {
                message: SYNC_IN_PROGRESS_MESSAGE.to_string(),
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(error = %e, "ticket listing failed");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        }
    }
}

/// GET /health
///
/// `status` follows the cache store only; an unreachable upstream is listed
/// under `adapters` while cached listings keep being served.
pub async fn get_health(State(state): State<GatewayState>) -> Json<HealthResponse> {
    let (storage, storage_healthy) =
        AdapterReport::collect(&**state.orchestrator.storage()).await;
    let (upstream, _) = AdapterReport::collect(&**state.orchestrator.source()).await;

    Json(HealthResponse {
        status: if storage_healthy { "ok" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_secs: state.health.start_time.elapsed().as_secs(),
        adapters: vec![storage, upstream],
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn webhook_ack_serializes() {
        let json = serde_json::to_value(WebhookAck {
            status: "ok",
            received: true,
        })
        .unwrap();
        assert_eq!(json, serde_json::json!({"status": "ok", "received": true}));
    }

    #[test]
    fn health_response_serializes() {
        let resp = HealthResponse {
            status: "ok".to_string(),
            version: "0.1.0".to_string(),
            uptime_secs: 42,
            adapters: vec![AdapterReport {
                name: "sqlite".to_string(),
                version: "0.1.0".to_string(),
                kind: "Storage".to_string(),
                health: "healthy".to_string(),
            }],
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("\"status\":\"ok\""));
        assert!(json.contains("\"version\":\"0.1.0\""));
        assert!(json.contains("\"uptime_secs\":42"));
        assert!(json.contains("\"kind\":\"Storage\""));
    }

    #[test]
    fn error_response_serializes() {
        let resp = ErrorResponse {
            error: "something went wrong".to_string(),
        };
        let json = serde_json::to_string(&resp).unwrap();
        assert!(json.contains("something went wrong"));
    }
}
