// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cursor-driven streams over the paged upstream endpoints.
//!
//! Each stream fetches lazily, one page per poll, and ends on the first empty
//! page or abandoned call. A hard error is yielded once and ends the stream.

use futures::stream::{self, Stream, TryStreamExt};
use tracing::{debug, warn};

use ticketdesk_core::TicketdeskError;

use crate::source::HelpdeskSource;
use crate::types::{Conversation, ConversationsPage, Message};

/// Page size of the upstream messages endpoint. A shorter page is the last one.
pub const MESSAGE_PAGE_SIZE: usize = 20;

/// Pages of the account-wide conversation listing, starting at page 1.
///
/// Stops after `max_pages` pages even if the upstream keeps answering.
pub fn conversation_pages(
    source: &dyn HelpdeskSource,
    max_pages: u32,
) -> impl Stream<Item = Result<ConversationsPage, TicketdeskError>> + Send + '_ {
    stream::unfold(Some(1u32), move |next| async move {
        let Some(page) = next else {
            return None;
        };
        if page > max_pages {
            warn!(max_pages, "conversation listing page cap reached, stopping");
            return None;
        }
        match source.conversations_page(page).await {
            Ok(Some(result)) if result.conversations.is_empty() => {
                debug!(page, "empty conversation page, listing complete");
                None
            }
            Ok(Some(result)) => {
                debug!(page, count = result.conversations.len(), "conversation page fetched");
                Some((Ok(result), Some(page + 1)))
            }
            Ok(None) => None,
            Err(e) => Some((Err(e), None)),
        }
    })
}

/// Where the message walk stands.
#[derive(Debug, Clone, Copy)]
enum Cursor {
    Newest,
    Before(i64),
    Done,
}

/// One step of the message walk.
enum Step {
    Page(Vec<Message>),
    /// A page call was abandoned; the walk ends here.
    Abandoned,
}

fn message_steps(
    source: &dyn HelpdeskSource,
    conversation_id: i64,
) -> impl Stream<Item = Result<Step, TicketdeskError>> + Send + '_ {
    stream::unfold(Cursor::Newest, move |cursor| async move {
        let before = match cursor {
            Cursor::Newest => None,
            Cursor::Before(id) => Some(id),
            Cursor::Done => return None,
        };

        let messages = match source.messages_before(conversation_id, before).await {
            Ok(Some(messages)) if messages.is_empty() => return None,
            Ok(Some(messages)) => messages,
            Ok(None) => return Some((Ok(Step::Abandoned), Cursor::Done)),
            Err(e) => return Some((Err(e), Cursor::Done)),
        };

        let next = match messages.iter().map(|m| m.id).min() {
            _ if messages.len() < MESSAGE_PAGE_SIZE => Cursor::Done,
            Some(lowest) if before.is_none_or(|b| lowest < b) => Cursor::Before(lowest),
            _ => {
                warn!(conversation_id, ?before, "message cursor did not advance, stopping");
                Cursor::Done
            }
        };
        Some((Ok(Step::Page(messages)), next))
    })
}

/// Pages of one conversation's messages following the `before` cursor,
/// most recent page first. Messages inside a page keep upstream order.
///
/// The next cursor is the smallest ID on the page. A cursor that fails to
/// decrease ends the walk so a misbehaving upstream cannot loop forever.
pub fn message_pages(
    source: &dyn HelpdeskSource,
    conversation_id: i64,
) -> impl Stream<Item = Result<Vec<Message>, TicketdeskError>> + Send + '_ {
    message_steps(source, conversation_id).try_filter_map(|step| async move {
        Ok(match step {
            Step::Page(messages) => Some(messages),
            Step::Abandoned => None,
        })
    })
}

/// Every conversation of the account plus the first page's `all_count`.
pub async fn collect_conversations(
    source: &dyn HelpdeskSource,
    max_pages: u32,
) -> Result<(Vec<Conversation>, Option<u64>), TicketdeskError> {
    conversation_pages(source, max_pages)
        .try_fold((Vec::new(), None), |(mut all, count), page| async move {
            let count = count.or(page.all_count);
            all.extend(page.conversations);
            Ok((all, count))
        })
        .await
}

/// The full message history of one conversation, in fetch order.
pub async fn collect_messages(
    source: &dyn HelpdeskSource,
    conversation_id: i64,
) -> Result<Vec<Message>, TicketdeskError> {
    message_pages(source, conversation_id).try_concat().await
}

/// The full message history, or `None` when any page call was abandoned.
///
/// Distinguishes "upstream has no messages" (`Some(vec![])`) from "upstream
/// could not be asked".
pub async fn fetch_history(
    source: &dyn HelpdeskSource,
    conversation_id: i64,
) -> Result<Option<Vec<Message>>, TicketdeskError> {
    message_steps(source, conversation_id)
        .try_fold(Some(Vec::new()), |history, step| async move {
            Ok(match (history, step) {
                (Some(mut all), Step::Page(page)) => {
                    all.extend(page);
                    Some(all)
                }
                _ => None,
            })
        })
        .await
}
