// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ticketdesk serve` command implementation.
//!
//! Opens the SQLite cache, connects the Chatwoot client, wires both into a
//! sync orchestrator and serves the HTTP API until a shutdown signal.

use std::sync::Arc;

use ticketdesk_chatwoot::ChatwootClient;
use ticketdesk_config::TicketdeskConfig;
use ticketdesk_core::{HealthStatus, PluginAdapter, StorageAdapter, TicketdeskError};
use ticketdesk_gateway::GatewayState;
use ticketdesk_storage::SqliteStorage;
use ticketdesk_sync::SyncOrchestrator;
use tracing::{info, warn};

use crate::shutdown;

/// The long-lived components shared by every command that talks to upstream.
pub struct Components {
    pub storage: Arc<SqliteStorage>,
    pub client: Arc<ChatwootClient>,
    pub orchestrator: Arc<SyncOrchestrator>,
}

impl Components {
    /// Shut down the upstream client, then checkpoint the cache.
    pub async fn shutdown(&self) -> Result<(), TicketdeskError> {
        for adapter in [&*self.client as &dyn PluginAdapter, &*self.storage] {
            adapter.shutdown().await?;
            info!(adapter = adapter.name(), version = %adapter.version(), "adapter shut down");
        }
        Ok(())
    }
}

/// Open the cache and build the client and orchestrator.
///
/// Fails when the Chatwoot credentials are not configured.
pub async fn build_components(config: &TicketdeskConfig) -> Result<Components, TicketdeskError> {
    let client = Arc::new(ChatwootClient::new(&config.chatwoot)?);

    let storage = {
        let storage = SqliteStorage::new(config.storage.clone());
        storage.initialize().await?;
        Arc::new(storage)
    };

    let orchestrator = Arc::new(SyncOrchestrator::new(
        storage.clone(),
        client.clone(),
        config.sync.clone(),
    ));

    Ok(Components {
        storage,
        client,
        orchestrator,
    })
}

/// Runs the `ticketdesk serve` command.
pub async fn run_serve(config: TicketdeskConfig) -> Result<(), TicketdeskError> {
    init_tracing(&config.server.log_level);

    info!("starting ticketdesk serve");

    let components = build_components(&config).await?;

    // An unreachable upstream is not fatal: the cache can still be served.
    match components.client.health_check().await {
        Ok(HealthStatus::Healthy) => info!("chatwoot reachable"),
        Ok(status) => warn!(?status, "chatwoot is not healthy, serving from cache"),
        Err(e) => warn!(error = %e, "chatwoot health check failed, serving from cache"),
    }

    let cached = components.storage.count_tickets().await?;
    info!(cached_tickets = cached, "ticket cache opened");

    let cancel = shutdown::install_signal_handler();
    let state = GatewayState::new(components.orchestrator.clone());
    let served = ticketdesk_gateway::start_server(&config.server, state, cancel).await;

    components.shutdown().await?;
    info!("ticketdesk serve shutdown complete");
    served
}

/// Initializes the tracing subscriber with the given log level.
///
/// `RUST_LOG` overrides the configured level.
pub fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("ticketdesk={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
