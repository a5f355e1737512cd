// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for ticketdesk.
//!
//! This crate provides the domain types shared by every other crate in the
//! workspace (tickets, conversation messages, attachments), the single error
//! type, and the adapter traits the cache store implements.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::TicketdeskError;
pub use types::{
    AdapterType, Attachment, ConversationMap, ConversationMessage, HealthStatus, Ticket,
};

pub use traits::{PluginAdapter, StorageAdapter};
