// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Decides when the cache is served, repaired or rebuilt from upstream.
//!
//! The orchestrator is the only writer of the cache: cold-start backfills,
//! webhook refreshes and incomplete-page repairs all go through it.

use std::cmp::Reverse;
use std::sync::Arc;

use tracing::{debug, info, warn};

use ticketdesk_chatwoot::pagination::{collect_conversations, collect_messages, fetch_history};
use ticketdesk_chatwoot::transform::{
    self, DEFAULT_CONTACT, UNKNOWN_CONTACT, conversation_to_ticket, transform_messages,
};
use ticketdesk_chatwoot::{Contact, Conversation, HelpdeskSource};
use ticketdesk_config::model::SyncConfig;
use ticketdesk_core::{
    ConversationMap, ConversationMessage, StorageAdapter, Ticket, TicketdeskError,
};

use crate::guard::SyncGuard;
use crate::listing::{ListingOutcome, ListingQuery, PageRequest, TicketListing};

/// Counts from a completed backfill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BackfillReport {
    pub tickets: usize,
    pub messages: usize,
}

/// Result of asking for a full backfill.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BackfillOutcome {
    Completed(BackfillReport),
    /// Another backfill holds the guard; nothing was done.
    InProgress,
}

/// Result of refreshing one conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// Whatever upstream returned was written.
    Refreshed {
        ticket_written: bool,
        messages: usize,
    },
    /// The cached ticket is newer than the upstream copy; nothing was written.
    Stale,
}

/// Coordinates the upstream source and the cache store.
pub struct SyncOrchestrator {
    storage: Arc<dyn StorageAdapter>,
    source: Arc<dyn HelpdeskSource>,
    config: SyncConfig,
    guard: Arc<SyncGuard>,
}

impl SyncOrchestrator {
    pub fn new(
        storage: Arc<dyn StorageAdapter>,
        source: Arc<dyn HelpdeskSource>,
        config: SyncConfig,
    ) -> Self {
        Self {
            storage,
            source,
            config,
            guard: Arc::new(SyncGuard::new()),
        }
    }

    /// Share a guard with another orchestrator or a test.
    pub fn with_guard(mut self, guard: Arc<SyncGuard>) -> Self {
        self.guard = guard;
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn storage(&self) -> &Arc<dyn StorageAdapter> {
        &self.storage
    }

    pub fn source(&self) -> &Arc<dyn HelpdeskSource> {
        &self.source
    }

    /// Whether a full backfill is running right now.
    pub fn is_syncing(&self) -> bool {
        self.guard.is_running()
    }

    /// Serve one page of tickets.
    ///
    /// With a contact filter the page is fetched live and nothing is cached.
    /// Otherwise an empty cache triggers a guarded backfill first, and cached
    /// tickets whose history is missing are repaired from upstream.
    pub async fn ticket_listing(
        &self,
        query: &ListingQuery,
    ) -> Result<ListingOutcome, TicketdeskError> {
        let request = query.page_request(&self.config);

        if let Some(contact_id) = query.contact() {
            return self
                .contact_listing(contact_id, request)
                .await
                .map(ListingOutcome::Ready);
        }

        if self.storage.count_tickets().await? == 0 {
            info!("ticket cache is empty, starting cold-start backfill");
            if self.full_backfill().await? == BackfillOutcome::InProgress {
                debug!("cold-start backfill already running");
                return Ok(ListingOutcome::SyncInProgress);
            }
        }

        self.cached_listing(request).await.map(ListingOutcome::Ready)
    }

    /// Rebuild the cache from a full upstream walk.
    ///
    /// Every ticket and history found is overwritten. Returns
    /// [`BackfillOutcome::InProgress`] without touching upstream when another
    /// backfill is running.
    pub async fn full_backfill(&self) -> Result<BackfillOutcome, TicketdeskError> {
        let Some(_permit) = self.guard.try_acquire() else {
            return Ok(BackfillOutcome::InProgress);
        };

        let (conversations, all_count) =
            collect_conversations(self.source.as_ref(), self.config.max_conversation_pages)
                .await?;
        info!(
            conversations = conversations.len(),
            upstream_total = ?all_count,
            "conversation listing fetched"
        );

        let mut tickets = Vec::with_capacity(conversations.len());
        let mut histories = ConversationMap::new();
        let mut message_count = 0;
        for conversation in &conversations {
            let (ticket, messages) = self.fetch_ticket(conversation).await?;
            message_count += messages.len();
            histories.insert(ticket.id.clone(), messages);
            tickets.push(ticket);
        }

        self.storage.upsert_tickets(&tickets).await?;
        self.storage.upsert_conversations(&histories).await?;

        let report = BackfillReport {
            tickets: tickets.len(),
            messages: message_count,
        };
        info!(tickets = report.tickets, messages = report.messages, "backfill complete");
        Ok(BackfillOutcome::Completed(report))
    }

    /// Refetch one conversation and its full history and overwrite the cache.
    ///
    /// The history is written even when the detail call is abandoned, so a
    /// message event can populate a ticket that was never listed.
    pub async fn refresh_conversation(
        &self,
        conversation_id: i64,
    ) -> Result<RefreshOutcome, TicketdeskError> {
        let detail = self.source.conversation(conversation_id).await?;

        let mut ticket_written = false;
        let contact_name = match &detail {
            Some(conversation) => {
                let contact = self.lookup_contact(conversation).await;
                let ticket = conversation_to_ticket(conversation, contact.as_ref());
                if self.config.reject_stale_webhooks {
                    if !self.storage.upsert_ticket_if_newer(&ticket).await? {
                        info!(conversation_id, "cached ticket is newer, skipping refresh");
                        return Ok(RefreshOutcome::Stale);
                    }
                } else {
                    self.storage.upsert_ticket(&ticket).await?;
                }
                ticket_written = true;
                transform::message_contact_name(conversation).to_string()
            }
            None => {
                warn!(conversation_id, "conversation detail unavailable, refreshing history only");
                DEFAULT_CONTACT.to_string()
            }
        };

        let raw = collect_messages(self.source.as_ref(), conversation_id).await?;
        let messages = transform_messages(&raw, &contact_name);
        if messages.is_empty() {
            warn!(conversation_id, "no messages found for conversation");
        } else {
            self.storage
                .upsert_conversation(&conversation_id.to_string(), &messages)
                .await?;
        }

        debug!(conversation_id, ticket_written, messages = messages.len(), "conversation refreshed");
        Ok(RefreshOutcome::Refreshed {
            ticket_written,
            messages: messages.len(),
        })
    }

    /// Page through the cache, repairing missing histories.
    async fn cached_listing(&self, request: PageRequest) -> Result<TicketListing, TicketdeskError> {
        let tickets = self
            .storage
            .list_tickets(request.page, request.per_page)
            .await?;
        let ids: Vec<String> = tickets.iter().map(|t| t.id.clone()).collect();
        let mut conversations = self.storage.get_conversations_by_ids(&ids).await?;

        let missing: Vec<&Ticket> = tickets
            .iter()
            .filter(|t| !conversations.contains_key(&t.id))
            .collect();
        for ticket in missing {
            let messages = self.repair_history(ticket).await?;
            conversations.insert(ticket.id.clone(), messages);
        }

        let total_tickets_count = self.total_count().await?;
        Ok(TicketListing {
            tickets,
            conversations,
            total_tickets_count,
        })
    }

    /// Live-fetch a cached ticket's missing history and write it back.
    ///
    /// A completed fetch is stored even when empty, so the next read is served
    /// from the cache. Abandoned or failed fetches are logged, yield an empty
    /// history for this response and leave the row missing for a later retry.
    /// Storage failures propagate.
    async fn repair_history(
        &self,
        ticket: &Ticket,
    ) -> Result<Vec<ConversationMessage>, TicketdeskError> {
        let Ok(conversation_id) = ticket.id.parse::<i64>() else {
            warn!(ticket_id = %ticket.id, "ticket id is not numeric, cannot repair history");
            return Ok(Vec::new());
        };

        let raw = match fetch_history(self.source.as_ref(), conversation_id).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                warn!(conversation_id, "history repair abandoned, not caching");
                return Ok(Vec::new());
            }
            Err(e) => {
                warn!(conversation_id, error = %e, "history repair failed");
                return Ok(Vec::new());
            }
        };

        let contact_name = if ticket.contact_name == UNKNOWN_CONTACT {
            DEFAULT_CONTACT
        } else {
            ticket.contact_name.as_str()
        };
        let messages = transform_messages(&raw, contact_name);
        self.storage
            .upsert_conversation(&ticket.id, &messages)
            .await?;
        debug!(conversation_id, messages = messages.len(), "history repaired");
        Ok(messages)
    }

    /// Local row count, or upstream `all_count` when reconciliation is on
    /// and the upstream answers.
    async fn total_count(&self) -> Result<u64, TicketdeskError> {
        let local = self.storage.count_tickets().await?;
        if !self.config.reconcile_total_count {
            return Ok(local);
        }
        match self.source.conversations_page(1).await {
            Ok(Some(page)) => Ok(page.all_count.unwrap_or(local)),
            Ok(None) => Ok(local),
            Err(e) => {
                warn!(error = %e, "could not reconcile total count, using local count");
                Ok(local)
            }
        }
    }

    /// Live listing of one contact's conversations, paged in memory.
    async fn contact_listing(
        &self,
        contact_id: &str,
        request: PageRequest,
    ) -> Result<TicketListing, TicketdeskError> {
        let Some(mut conversations) = self.source.contact_conversations(contact_id).await? else {
            return Ok(TicketListing::default());
        };
        conversations.sort_by_key(|c| (Reverse(c.last_activity_at), c.id.to_string()));

        let total = conversations.len();
        let skip = (request.page as usize - 1).saturating_mul(request.per_page as usize);
        let mut listing = TicketListing {
            total_tickets_count: total as u64,
            ..TicketListing::default()
        };
        for conversation in conversations.iter().skip(skip).take(request.per_page as usize) {
            let (ticket, messages) = self.fetch_ticket(conversation).await?;
            listing.conversations.insert(ticket.id.clone(), messages);
            listing.tickets.push(ticket);
        }
        debug!(contact_id, total, returned = listing.tickets.len(), "contact listing served");
        Ok(listing)
    }

    /// Transform a listed conversation and fetch its full history.
    async fn fetch_ticket(
        &self,
        conversation: &Conversation,
    ) -> Result<(Ticket, Vec<ConversationMessage>), TicketdeskError> {
        let contact = self.lookup_contact(conversation).await;
        let ticket = conversation_to_ticket(conversation, contact.as_ref());
        let raw = collect_messages(self.source.as_ref(), conversation.id).await?;
        let messages = transform_messages(&raw, transform::message_contact_name(conversation));
        Ok((ticket, messages))
    }

    /// The requester's contact record, when lookups are enabled and succeed.
    async fn lookup_contact(&self, conversation: &Conversation) -> Option<Contact> {
        if !self.config.fetch_contact_details {
            return None;
        }
        let contact_id = conversation.meta.sender.as_ref()?.id?;
        match self.source.contact(contact_id).await {
            Ok(contact) => contact,
            Err(e) => {
                warn!(contact_id, error = %e, "contact lookup failed, using embedded sender");
                None
            }
        }
    }
}
