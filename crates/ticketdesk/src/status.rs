// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ticketdesk status` command implementation.
//!
//! Reports the number of cached tickets and probes the health endpoint of
//! a running server. Falls back gracefully when the server is not running.

use std::io::IsTerminal;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use ticketdesk_config::TicketdeskConfig;
use ticketdesk_core::{StorageAdapter, TicketdeskError};
use ticketdesk_storage::SqliteStorage;

/// Health endpoint response from the server.
#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
    uptime_secs: u64,
}

/// Structured status output for `--json` mode.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub running: bool,
    pub status: String,
    pub uptime_secs: Option<u64>,
    pub uptime_human: Option<String>,
    pub cached_tickets: u64,
    pub database_path: String,
    pub server_host: String,
    pub server_port: u16,
}

/// Format seconds into a human-readable duration string.
fn format_uptime(secs: u64) -> String {
    let days = secs / 86400;
    let hours = (secs % 86400) / 3600;
    let minutes = (secs % 3600) / 60;

    if days > 0 {
        format!("{days}d {hours}h {minutes}m")
    } else if hours > 0 {
        format!("{hours}h {minutes}m")
    } else {
        format!("{minutes}m")
    }
}

async fn cached_ticket_count(config: &TicketdeskConfig) -> Result<u64, TicketdeskError> {
    let storage = SqliteStorage::new(config.storage.clone());
    storage.initialize().await?;
    let count = storage.count_tickets().await;
    storage.close().await?;
    count
}

async fn probe_health(config: &TicketdeskConfig) -> Result<Option<HealthResponse>, TicketdeskError> {
    let url = format!("http://{}:{}/health", config.server.host, config.server.port);

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(3))
        .build()
        .map_err(|e| TicketdeskError::Internal(format!("failed to create HTTP client: {e}")))?;

    match client.get(&url).send().await {
        Ok(resp) if resp.status().is_success() => {
            let health = resp.json().await.map_err(|e| {
                TicketdeskError::Internal(format!("failed to parse health response: {e}"))
            })?;
            Ok(Some(health))
        }
        _ => Ok(None),
    }
}

/// Run the `ticketdesk status` command.
///
/// If `--json` is passed, outputs structured JSON for scripting.
/// If `--plain` is passed or stdout is not a TTY, disables colors.
pub async fn run_status(
    config: &TicketdeskConfig,
    json: bool,
    plain: bool,
) -> Result<(), TicketdeskError> {
    let cached_tickets = cached_ticket_count(config).await?;
    let health = probe_health(config).await?;

    let status_resp = StatusResponse {
        running: health.is_some(),
        status: health
            .as_ref()
            .map_or_else(|| "not running".to_string(), |h| h.status.clone()),
        uptime_secs: health.as_ref().map(|h| h.uptime_secs),
        uptime_human: health.as_ref().map(|h| format_uptime(h.uptime_secs)),
        cached_tickets,
        database_path: config.storage.database_path.clone(),
        server_host: config.server.host.clone(),
        server_port: config.server.port,
    };

    if json {
        println!(
            "{}",
            serde_json::to_string_pretty(&status_resp).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        let use_color = !plain && std::io::stdout().is_terminal();
        print_status(&status_resp, use_color);
    }

    Ok(())
}

fn print_status(status: &StatusResponse, use_color: bool) {
    use colored::Colorize;

    println!();
    println!("  ticketdesk status");
    println!("  {}", "-".repeat(35));

    match (&status.uptime_human, use_color) {
        (Some(uptime), true) => println!(
            "    State:    {} {} (uptime: {uptime})",
            "✓".green(),
            status.status.green()
        ),
        (Some(uptime), false) => {
            println!("    State:    [OK] {} (uptime: {uptime})", status.status)
        }
        (None, true) => println!("    State:    {} {}", "✗".red(), "not running".red()),
        (None, false) => println!("    State:    [FAIL] not running"),
    }

    println!(
        "    Endpoint: http://{}:{}/health",
        status.server_host, status.server_port
    );
    println!(
        "    Cache:    {} tickets in {}",
        status.cached_tickets, status.database_path
    );
    if !status.running {
        println!();
        println!("  Start with: ticketdesk serve");
    }
    println!();
}
