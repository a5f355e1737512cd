// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite cache for ticket summaries and conversation histories.
//!
//! WAL-mode SQLite with embedded migrations. All statements go through
//! `tokio-rusqlite`'s single background thread.

pub mod adapter;
pub mod database;
pub mod migrations;
pub mod queries;

pub use adapter::SqliteStorage;
pub use database::Database;
