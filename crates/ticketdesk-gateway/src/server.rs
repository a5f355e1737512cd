// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.
//!
//! Sets up routes, middleware, and shared state for the gateway.

use std::sync::Arc;
use std::time::Instant;

use axum::{
    Router,
    routing::{get, post},
};
use tokio_util::sync::CancellationToken;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use ticketdesk_config::model::ServerConfig;
use ticketdesk_core::TicketdeskError;
use ticketdesk_sync::SyncOrchestrator;

use crate::handlers;

/// Health state for the unauthenticated health endpoint.
#[derive(Debug, Clone)]
pub struct HealthState {
    /// Process start time for uptime calculation.
    pub start_time: Instant,
}

impl Default for HealthState {
    fn default() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }
}

/// Shared state for axum request handlers.
#[derive(Clone)]
pub struct GatewayState {
    pub orchestrator: Arc<SyncOrchestrator>,
    pub health: HealthState,
}

impl GatewayState {
    pub fn new(orchestrator: Arc<SyncOrchestrator>) -> Self {
        Self {
            orchestrator,
            health: HealthState::default(),
        }
    }
}

/// Build the application router.
///
/// - POST /api/chatwoot-webhook
/// - GET /api/ticket-history
/// - GET /health
pub fn build_router(state: GatewayState) -> Router {
    Router::new()
        .route("/api/chatwoot-webhook", post(handlers::post_webhook))
        .route("/api/ticket-history", get(handlers::get_ticket_history))
        .route("/health", get(handlers::get_health))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
}

/// Bind to the configured host:port and serve until `shutdown` is cancelled.
pub async fn start_server(
    config: &ServerConfig,
    state: GatewayState,
    shutdown: CancellationToken,
) -> Result<(), TicketdeskError> {
    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| TicketdeskError::Internal(format!("failed to bind {addr}: {e}")))?;

    tracing::info!("HTTP server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown.cancelled_owned())
        .await
        .map_err(|e| TicketdeskError::Internal(format!("server error: {e}")))?;

    tracing::info!("HTTP server stopped");
    Ok(())
}
