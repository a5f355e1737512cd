// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedded schema migrations.
//!
//! The SQL files under `migrations/` are compiled in with `embed_migrations!`
//! and applied every time the database is opened.

use ticketdesk_core::TicketdeskError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Apply all pending migrations.
///
/// Applied versions are tracked in `refinery_schema_history`, so reopening an
/// existing cache is a no-op.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), TicketdeskError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(TicketdeskError::storage)?;
    for migration in report.applied_migrations() {
        tracing::debug!(version = migration.version(), name = migration.name(), "applied migration");
    }
    Ok(())
}
