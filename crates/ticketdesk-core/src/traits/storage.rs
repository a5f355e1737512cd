// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Storage adapter trait for the local ticket cache.

use async_trait::async_trait;

use crate::error::TicketdeskError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{ConversationMap, ConversationMessage, Ticket};

/// Adapter for the persisted ticket cache.
///
/// Every write is a replace-by-primary-key overwrite: a conversation write
/// is a full snapshot of that ticket's history, never an append.
#[async_trait]
pub trait StorageAdapter: PluginAdapter {
    /// Initializes the storage backend (migrations, connection).
    async fn initialize(&self) -> Result<(), TicketdeskError>;

    /// Closes the storage backend, flushing pending writes.
    async fn close(&self) -> Result<(), TicketdeskError>;

    // --- Tickets ---

    /// Inserts or overwrites one ticket.
    async fn upsert_ticket(&self, ticket: &Ticket) -> Result<(), TicketdeskError>;

    /// Inserts or overwrites many tickets in one transaction.
    async fn upsert_tickets(&self, tickets: &[Ticket]) -> Result<(), TicketdeskError>;

    /// Overwrites a ticket only if the stored row is not newer.
    ///
    /// Returns `false` when the stored `last_activity_at` is greater than the
    /// incoming one and the write was skipped.
    async fn upsert_ticket_if_newer(&self, ticket: &Ticket) -> Result<bool, TicketdeskError>;

    /// Reads one page of tickets ordered by last activity, newest first.
    /// `page` is 1-indexed.
    async fn list_tickets(&self, page: u32, per_page: u32)
    -> Result<Vec<Ticket>, TicketdeskError>;

    /// Total number of cached tickets.
    async fn count_tickets(&self) -> Result<u64, TicketdeskError>;

    // --- Conversations ---

    /// Replaces the message history of one ticket.
    async fn upsert_conversation(
        &self,
        ticket_id: &str,
        messages: &[ConversationMessage],
    ) -> Result<(), TicketdeskError>;

    /// Replaces the message histories of many tickets in one transaction.
    async fn upsert_conversations(
        &self,
        conversations: &ConversationMap,
    ) -> Result<(), TicketdeskError>;

    /// Reads one ticket's message history, `None` when nothing is cached.
    async fn get_conversation(
        &self,
        ticket_id: &str,
    ) -> Result<Option<Vec<ConversationMessage>>, TicketdeskError>;

    /// Reads the histories for the given ticket IDs. IDs without a cached
    /// history are absent from the result.
    async fn get_conversations_by_ids(
        &self,
        ticket_ids: &[String],
    ) -> Result<ConversationMap, TicketdeskError>;

    /// Deletes every cached ticket and conversation.
    async fn clear(&self) -> Result<(), TicketdeskError>;
}
