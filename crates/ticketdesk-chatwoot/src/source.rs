// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The upstream helpdesk seen as a set of paged reads.

use async_trait::async_trait;
use ticketdesk_core::{PluginAdapter, TicketdeskError};

use crate::types::{Contact, Conversation, ConversationsPage, Message};

/// Read access to the upstream helpdesk.
///
/// Every method returns `Ok(None)` when the call was abandoned (transport
/// failure or non-success status, already logged). `Err` is reserved for
/// responses that arrived but cannot be used.
#[async_trait]
pub trait HelpdeskSource: PluginAdapter {
    /// One page of the account-wide listing, most recent activity first.
    /// `page` starts at 1.
    async fn conversations_page(
        &self,
        page: u32,
    ) -> Result<Option<ConversationsPage>, TicketdeskError>;

    /// Every conversation of one contact (single unpaginated call).
    async fn contact_conversations(
        &self,
        contact_id: &str,
    ) -> Result<Option<Vec<Conversation>>, TicketdeskError>;

    /// A single conversation's detail.
    async fn conversation(&self, id: i64) -> Result<Option<Conversation>, TicketdeskError>;

    /// One page of up to 20 messages: the newest ones below `before`, in
    /// ascending ID order. The smallest ID on the page is the next cursor.
    async fn messages_before(
        &self,
        conversation_id: i64,
        before: Option<i64>,
    ) -> Result<Option<Vec<Message>>, TicketdeskError>;

    /// A contact record.
    async fn contact(&self, id: i64) -> Result<Option<Contact>, TicketdeskError>;
}
