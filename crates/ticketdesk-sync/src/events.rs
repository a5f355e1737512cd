// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chatwoot webhook events and how each one touches the cache.

use serde_json::Value;
use tracing::{error, info, warn};

use crate::orchestrator::{RefreshOutcome, SyncOrchestrator};

/// A webhook delivery, classified by its `event` field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookEvent {
    /// `conversation_created`, `conversation_updated`,
    /// `conversation_status_changed`. The conversation ID is the top-level `id`.
    Conversation {
        event: String,
        conversation_id: Option<i64>,
    },
    /// `message_created`, `message_updated`. The conversation ID is
    /// `conversation.id`.
    Message {
        event: String,
        conversation_id: Option<i64>,
    },
    /// `contact_created`, `contact_updated`.
    Contact { event: String },
    /// Anything else, including a missing `event` field.
    Unhandled { event: Option<String> },
}

/// What handling an event did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventDisposition {
    Refreshed(RefreshOutcome),
    /// Recognised but nothing to do (contact events, missing IDs).
    Ignored,
    Unhandled,
    /// The refresh failed; the error was logged.
    Failed,
}

/// Accept a numeric ID sent either as a JSON number or a string.
fn id_at(payload: &Value, pointer: &str) -> Option<i64> {
    match payload.pointer(pointer)? {
        Value::Number(n) => n.as_i64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

impl WebhookEvent {
    pub fn from_payload(payload: &Value) -> Self {
        let Some(event) = payload.get("event").and_then(Value::as_str) else {
            return Self::Unhandled { event: None };
        };
        let event = event.to_string();
        match event.as_str() {
            "conversation_created" | "conversation_updated" | "conversation_status_changed" => {
                Self::Conversation {
                    conversation_id: id_at(payload, "/id"),
                    event,
                }
            }
            "message_created" | "message_updated" => Self::Message {
                conversation_id: id_at(payload, "/conversation/id"),
                event,
            },
            "contact_created" | "contact_updated" => Self::Contact { event },
            _ => Self::Unhandled { event: Some(event) },
        }
    }

    /// Apply the event to the cache.
    ///
    /// Never fails: refresh errors are logged and reported as
    /// [`EventDisposition::Failed`] so one bad event cannot fail the delivery.
    pub async fn apply(&self, orchestrator: &SyncOrchestrator) -> EventDisposition {
        let (event, conversation_id) = match self {
            Self::Conversation {
                event,
                conversation_id,
            }
            | Self::Message {
                event,
                conversation_id,
            } => (event, *conversation_id),
            Self::Contact { event } => {
                info!(event = %event, "contact event received, nothing to update");
                return EventDisposition::Ignored;
            }
            Self::Unhandled { event } => {
                info!(event = ?event, "unhandled webhook event");
                return EventDisposition::Unhandled;
            }
        };

        let Some(conversation_id) = conversation_id else {
            warn!(event = %event, "webhook event carries no conversation id");
            return EventDisposition::Ignored;
        };

        match orchestrator.refresh_conversation(conversation_id).await {
            Ok(outcome) => {
                info!(event = %event, conversation_id, ?outcome, "webhook event applied");
                EventDisposition::Refreshed(outcome)
            }
            Err(e) => {
                error!(event = %event, conversation_id, error = %e, "webhook event failed");
                EventDisposition::Failed
            }
        }
    }
}
