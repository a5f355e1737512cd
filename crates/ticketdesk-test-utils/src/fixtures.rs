// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Builders for upstream objects.

use serde_json::json;
use ticketdesk_chatwoot::{Contact, Conversation, Message};

/// A conversation with a requester, an inbox, an agent and one embedded message.
pub fn conversation(id: i64, status: &str, last_activity_at: i64) -> Conversation {
    from_json(json!({
        "id": id,
        "status": status,
        "created_at": 1_709_251_200,
        "last_activity_at": last_activity_at,
        "labels": [],
        "custom_attributes": {},
        "messages": [{"id": id * 1000, "content": format!("Problema na conversa {id}")}],
        "meta": {
            "sender": {"id": id + 500, "name": format!("Cliente {id}")},
            "assignee": {"id": 9, "name": "Ana"},
            "inbox": {"id": 1, "name": "WhatsApp"}
        }
    }))
}

/// An incoming message from the requester.
pub fn message(id: i64, content: &str, created_at: i64) -> Message {
    from_json(json!({
        "id": id,
        "content": content,
        "created_at": created_at,
        "message_type": 0,
        "private": false,
        "sender": {"id": 1, "name": "Cliente", "type": "contact"}
    }))
}

/// A contact whose company is set through `company.name`.
pub fn contact(id: i64, company: &str) -> Contact {
    from_json(json!({
        "id": id,
        "name": format!("Contato {id}"),
        "company": {"id": 1, "name": company}
    }))
}

fn from_json<T: serde::de::DeserializeOwned>(value: serde_json::Value) -> T {
    serde_json::from_value(value).unwrap_or_else(|e| panic!("invalid fixture: {e}"))
}
