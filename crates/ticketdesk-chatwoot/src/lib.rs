// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chatwoot helpdesk integration for ticketdesk.
//!
//! [`ChatwootClient`] talks to the upstream API, [`pagination`] walks its
//! cursors as streams and [`transform`] turns conversations into dashboard
//! tickets.

pub mod client;
pub mod pagination;
pub mod source;
pub mod transform;
pub mod types;

pub use client::ChatwootClient;
pub use source::HelpdeskSource;
pub use types::{Contact, Conversation, ConversationsPage, Message};
