// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ticketdesk sync` command implementation.

use ticketdesk_config::TicketdeskConfig;
use ticketdesk_core::{StorageAdapter, TicketdeskError};
use ticketdesk_sync::{BackfillOutcome, SyncOrchestrator};
use tracing::info;

use crate::serve::{build_components, init_tracing};

/// Runs one guarded backfill, clearing the cache first when `reset` is set.
pub async fn run_sync(config: TicketdeskConfig, reset: bool) -> Result<(), TicketdeskError> {
    init_tracing(&config.server.log_level);

    let components = build_components(&config).await?;
    let result = backfill(&components.orchestrator, reset).await;
    components.shutdown().await?;

    let outcome = result?;
    match outcome {
        BackfillOutcome::Completed(report) => println!(
            "ticketdesk sync: {} tickets, {} messages cached",
            report.tickets, report.messages
        ),
        BackfillOutcome::InProgress => println!("ticketdesk sync: a sync is already running"),
    }
    Ok(())
}

pub(crate) async fn backfill(
    orchestrator: &SyncOrchestrator,
    reset: bool,
) -> Result<BackfillOutcome, TicketdeskError> {
    if reset {
        orchestrator.storage().clear().await?;
        info!("ticket cache cleared");
    }
    orchestrator.full_backfill().await
}
