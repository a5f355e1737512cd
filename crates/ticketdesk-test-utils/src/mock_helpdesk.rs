// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory helpdesk for deterministic tests.
//!
//! `MockHelpdesk` implements `HelpdeskSource` over scripted data, counts
//! every call and can hold the conversation listing open so tests can
//! overlap two backfills.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use tokio::sync::{Notify, Semaphore};

use ticketdesk_chatwoot::pagination::MESSAGE_PAGE_SIZE;
use ticketdesk_chatwoot::{Contact, Conversation, ConversationsPage, HelpdeskSource, Message};
use ticketdesk_core::{AdapterType, HealthStatus, PluginAdapter, TicketdeskError};

#[derive(Default)]
struct Script {
    listing: Vec<Vec<Conversation>>,
    all_count: Option<u64>,
    abandon_listing: bool,
    details: HashMap<i64, Conversation>,
    messages: HashMap<i64, Vec<Message>>,
    malformed_messages: HashSet<i64>,
    abandoned_messages: HashSet<i64>,
    contacts: HashMap<i64, Contact>,
    contact_conversations: HashMap<String, Vec<Conversation>>,
    listing_gate: Option<Arc<Semaphore>>,
}

/// Scriptable in-memory `HelpdeskSource`.
///
/// Listing page `n` serves `listing[n - 1]`; pages past the end are empty.
/// Message histories are paged like Chatwoot: each page holds the newest 20
/// messages below `before`, in ascending ID order.
#[derive(Default)]
pub struct MockHelpdesk {
    script: Mutex<Script>,
    listing_started: Notify,
    listing_calls: AtomicUsize,
    detail_calls: AtomicUsize,
    message_calls: AtomicUsize,
    contact_calls: AtomicUsize,
}

impl MockHelpdesk {
    pub fn new() -> Self {
        Self::default()
    }

    fn script(&self) -> MutexGuard<'_, Script> {
        // A poisoned lock only means another test thread panicked.
        self.script.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Listing pages. Every listed conversation is also served by the
    /// detail endpoint.
    pub fn with_listing(self, pages: Vec<Vec<Conversation>>) -> Self {
        {
            let mut script = self.script();
            for conversation in pages.iter().flatten() {
                script.details.insert(conversation.id, conversation.clone());
            }
            script.listing = pages;
        }
        self
    }

    /// The `all_count` reported with every listing page.
    pub fn with_all_count(self, count: u64) -> Self {
        self.script().all_count = Some(count);
        self
    }

    /// Abandon every listing call, as on an upstream outage.
    pub fn with_abandoned_listing(self) -> Self {
        self.script().abandon_listing = true;
        self
    }

    pub fn with_conversation(self, conversation: Conversation) -> Self {
        self.put_conversation(conversation);
        self
    }

    pub fn with_messages(self, conversation_id: i64, messages: Vec<Message>) -> Self {
        self.put_messages(conversation_id, messages);
        self
    }

    /// Answer the messages endpoint of this conversation with a malformed payload.
    pub fn with_malformed_messages(self, conversation_id: i64) -> Self {
        self.script().malformed_messages.insert(conversation_id);
        self
    }

    /// Abandon every messages call of this conversation.
    pub fn with_abandoned_messages(self, conversation_id: i64) -> Self {
        self.script().abandoned_messages.insert(conversation_id);
        self
    }

    pub fn with_contact(self, contact: Contact) -> Self {
        if let Some(id) = contact.id {
            self.script().contacts.insert(id, contact);
        }
        self
    }

    pub fn with_contact_conversations(
        self,
        contact_id: &str,
        conversations: Vec<Conversation>,
    ) -> Self {
        self.script()
            .contact_conversations
            .insert(contact_id.to_string(), conversations);
        self
    }

    /// Block listing calls until [`release_listing`](Self::release_listing).
    pub fn with_held_listing(self) -> Self {
        self.script().listing_gate = Some(Arc::new(Semaphore::new(0)));
        self
    }

    /// Let held listing calls proceed.
    pub fn release_listing(&self) {
        if let Some(gate) = self.script().listing_gate.take() {
            gate.add_permits(Semaphore::MAX_PERMITS / 2);
        }
    }

    /// Resolves once a listing call has started.
    pub async fn listing_started(&self) {
        self.listing_started.notified().await;
    }

    /// Replace or add a conversation detail after construction.
    pub fn put_conversation(&self, conversation: Conversation) {
        self.script().details.insert(conversation.id, conversation);
    }

    /// Replace a conversation's message history after construction.
    pub fn put_messages(&self, conversation_id: i64, messages: Vec<Message>) {
        self.script().messages.insert(conversation_id, messages);
    }

    pub fn listing_calls(&self) -> usize {
        self.listing_calls.load(Ordering::SeqCst)
    }

    pub fn detail_calls(&self) -> usize {
        self.detail_calls.load(Ordering::SeqCst)
    }

    pub fn message_calls(&self) -> usize {
        self.message_calls.load(Ordering::SeqCst)
    }

    pub fn contact_calls(&self) -> usize {
        self.contact_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl PluginAdapter for MockHelpdesk {
    fn name(&self) -> &str {
        "mock-helpdesk"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Helpdesk
    }

    async fn health_check(&self) -> Result<HealthStatus, TicketdeskError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TicketdeskError> {
        Ok(())
    }
}

#[async_trait]
impl HelpdeskSource for MockHelpdesk {
    async fn conversations_page(
        &self,
        page: u32,
    ) -> Result<Option<ConversationsPage>, TicketdeskError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        self.listing_started.notify_one();

        let gate = self.script().listing_gate.clone();
        if let Some(gate) = gate {
            // The permit goes back on drop so later calls pass too.
            let _permit = gate
                .acquire()
                .await
                .map_err(|e| TicketdeskError::Internal(e.to_string()))?;
        }

        let script = self.script();
        if script.abandon_listing {
            return Ok(None);
        }
        let conversations = (page as usize)
            .checked_sub(1)
            .and_then(|index| script.listing.get(index))
            .cloned()
            .unwrap_or_default();
        Ok(Some(ConversationsPage {
            conversations,
            all_count: script.all_count,
        }))
    }

    async fn contact_conversations(
        &self,
        contact_id: &str,
    ) -> Result<Option<Vec<Conversation>>, TicketdeskError> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.script().contact_conversations.get(contact_id).cloned())
    }

    async fn conversation(&self, id: i64) -> Result<Option<Conversation>, TicketdeskError> {
        self.detail_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.script().details.get(&id).cloned())
    }

    async fn messages_before(
        &self,
        conversation_id: i64,
        before: Option<i64>,
    ) -> Result<Option<Vec<Message>>, TicketdeskError> {
        self.message_calls.fetch_add(1, Ordering::SeqCst);
        let script = self.script();
        if script.malformed_messages.contains(&conversation_id) {
            return Err(TicketdeskError::MalformedPayload(
                "message listing: payload is not an array".into(),
            ));
        }
        if script.abandoned_messages.contains(&conversation_id) {
            return Ok(None);
        }

        let mut history: Vec<Message> = script
            .messages
            .get(&conversation_id)
            .map(|all| {
                all.iter()
                    .filter(|m| before.is_none_or(|b| m.id < b))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        history.sort_by_key(|m| std::cmp::Reverse(m.id));
        history.truncate(MESSAGE_PAGE_SIZE);
        history.reverse();
        Ok(Some(history))
    }

    async fn contact(&self, id: i64) -> Result<Option<Contact>, TicketdeskError> {
        self.contact_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.script().contacts.get(&id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn listing_serves_pages_then_empty() {
        let mock = MockHelpdesk::new()
            .with_listing(vec![vec![fixtures::conversation(1, "open", 10)]])
            .with_all_count(1);

        let first = mock.conversations_page(1).await.unwrap().unwrap();
        assert_eq!(first.conversations.len(), 1);
        assert_eq!(first.all_count, Some(1));
        let second = mock.conversations_page(2).await.unwrap().unwrap();
        assert!(second.conversations.is_empty());
        assert_eq!(mock.listing_calls(), 2);
        assert!(mock.conversation(1).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn messages_page_is_newest_slice_in_ascending_order() {
        let history = (1..=45).map(|id| fixtures::message(id, "x", id * 10)).collect();
        let mock = MockHelpdesk::new().with_messages(7, history);

        let page = mock.messages_before(7, None).await.unwrap().unwrap();
        let ids: Vec<i64> = page.iter().map(|m| m.id).collect();
        assert_eq!(ids, (26..=45).collect::<Vec<_>>());
        let page = mock.messages_before(7, Some(6)).await.unwrap().unwrap();
        let ids: Vec<i64> = page.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4, 5]);
    }

    #[tokio::test]
    async fn abandoned_messages_answer_none() {
        let mock = MockHelpdesk::new()
            .with_messages(7, vec![fixtures::message(1, "x", 10)])
            .with_abandoned_messages(7);

        assert!(mock.messages_before(7, None).await.unwrap().is_none());
        assert_eq!(mock.message_calls(), 1);
    }

    #[tokio::test]
    async fn held_listing_waits_for_release() {
        let mock = Arc::new(MockHelpdesk::new().with_held_listing());
        let task = {
            let mock = Arc::clone(&mock);
            tokio::spawn(async move { mock.conversations_page(1).await })
        };

        mock.listing_started().await;
        assert!(!task.is_finished());
        mock.release_listing();
        assert!(task.await.unwrap().unwrap().is_some());
    }
}
