// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Domain types shared across the cache store, the transformer and the HTTP API.
//!
//! The serde names are the wire format consumed by the dashboard UI, so the
//! Portuguese keys (`assunto`, `empresa`) are kept on the wire while the Rust
//! fields use descriptive names.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// A support ticket as served to the dashboard.
///
/// Identity is the upstream conversation ID rendered as a string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: String,
    /// Display label, e.g. `Resolvido`.
    pub status: String,
    /// CSS class tag, e.g. `status-resolved`.
    pub status_class: String,
    /// Inbox name.
    #[serde(rename = "type")]
    pub inbox: String,
    /// Subject, truncated for table display.
    #[serde(rename = "assunto")]
    pub subject: String,
    /// Assigned agent name.
    pub agent: String,
    /// Creation date as `DD/MM/YYYY`.
    pub date_created: String,
    /// Epoch seconds of the most recent upstream activity.
    pub last_activity_at: i64,
    /// Requester name.
    pub contact_name: String,
    #[serde(rename = "empresa")]
    pub company: String,
    /// Full, untruncated subject shown in the conversation modal.
    #[serde(rename = "modalDescription")]
    pub description: String,
}

/// A message inside a ticket's conversation history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationMessage {
    /// Upstream message ID.
    pub id: i64,
    /// Sender label, e.g. `Maria (Cliente)` or `Sistema`.
    pub sender: String,
    pub text: String,
    /// Epoch seconds.
    pub timestamp: i64,
    pub is_system_message: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachments: Option<Vec<Attachment>>,
}

/// An attachment passed through from the upstream helpdesk unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub id: i64,
    /// `image`, `audio`, `video`, `file`, or anything else the upstream sends.
    #[serde(default)]
    pub file_type: String,
    #[serde(default)]
    pub data_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumb_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_name: Option<String>,
}

/// Message histories keyed by ticket ID.
pub type ConversationMap = BTreeMap<String, Vec<ConversationMessage>>;

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Adapter is fully operational.
    Healthy,
    /// Adapter is operational but experiencing issues.
    Degraded(String),
    /// Adapter is not operational.
    Unhealthy(String),
}

/// Identifies the kind of adapter.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
pub enum AdapterType {
    Storage,
    Helpdesk,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ticket() -> Ticket {
        Ticket {
            id: "42".into(),
            status: "Aberto".into(),
            status_class: "status-aberto".into(),
            inbox: "Suporte".into(),
            subject: "Loja fora do ar".into(),
            agent: "Ana".into(),
            date_created: "01/02/2026".into(),
            last_activity_at: 1_769_904_000,
            contact_name: "Maria".into(),
            company: "ACME".into(),
            description: "Loja fora do ar".into(),
        }
    }

    #[test]
    fn ticket_serializes_with_dashboard_keys() {
        let json = serde_json::to_value(sample_ticket()).unwrap();
        let obj = json.as_object().unwrap();
        for key in [
            "id",
            "status",
            "statusClass",
            "type",
            "assunto",
            "agent",
            "dateCreated",
            "lastActivityAt",
            "contactName",
            "empresa",
            "modalDescription",
        ] {
            assert!(obj.contains_key(key), "missing key {key}");
        }
        assert_eq!(obj.len(), 11);
    }

    #[test]
    fn message_without_attachments_omits_the_key() {
        let msg = ConversationMessage {
            id: 7,
            sender: "Sistema".into(),
            text: "(Ação do sistema ou nota interna)".into(),
            timestamp: 10,
            is_system_message: true,
            attachments: None,
        };
        let json = serde_json::to_string(&msg).unwrap();
        assert!(json.contains("\"isSystemMessage\":true"));
        assert!(!json.contains("attachments"));
    }

    #[test]
    fn attachment_tolerates_missing_optional_fields() {
        let att: Attachment =
            serde_json::from_str(r#"{"id": 3, "file_type": "image"}"#).unwrap();
        assert_eq!(att.file_type, "image");
        assert!(att.data_url.is_empty());
        assert!(att.file_name.is_none());
    }
}
