// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chatwoot API response types.
//!
//! Only the fields the transformer reads are modelled. Chatwoot sends `null`
//! for many optional objects, so collections and maps treat `null` as empty.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use ticketdesk_core::Attachment;

/// Deserialize `null` as `T::default()`.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Free-form attribute bag (`custom_attributes`, `additional_attributes`).
pub type Attributes = Map<String, Value>;

/// Read a string attribute, ignoring non-string values.
pub fn attribute<'a>(attrs: &'a Attributes, key: &str) -> Option<&'a str> {
    attrs.get(key).and_then(Value::as_str)
}

/// A conversation as returned by the listing and detail endpoints.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Conversation {
    pub id: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: String,
    /// Epoch seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: i64,
    /// Epoch seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub last_activity_at: i64,
    /// Messages embedded in the listing; usually only the latest few.
    #[serde(default, deserialize_with = "null_as_default")]
    pub messages: Vec<Message>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_attributes: Attributes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub meta: ConversationMeta,
}

/// The `meta` block of a conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConversationMeta {
    /// The requester.
    #[serde(default)]
    pub sender: Option<Contact>,
    #[serde(default)]
    pub assignee: Option<NamedRef>,
    #[serde(default)]
    pub inbox: Option<NamedRef>,
}

/// Any upstream object of which only the name is used.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamedRef {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

/// A contact, either embedded as `meta.sender` or fetched from `/contacts/{id}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub custom_attributes: Attributes,
    #[serde(default, deserialize_with = "null_as_default")]
    pub additional_attributes: Attributes,
    #[serde(default)]
    pub company: Option<NamedRef>,
}

/// Chatwoot message direction codes.
pub mod message_type {
    pub const INCOMING: i64 = 0;
    pub const OUTGOING: i64 = 1;
    pub const ACTIVITY: i64 = 2;
    pub const TEMPLATE: i64 = 3;
}

/// A message from `/conversations/{id}/messages`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: i64,
    #[serde(default)]
    pub content: Option<String>,
    /// Epoch seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub message_type: i64,
    #[serde(default, deserialize_with = "null_as_default")]
    pub private: bool,
    #[serde(default)]
    pub sender: Option<MessageSender>,
    #[serde(default)]
    pub attachments: Option<Vec<Attachment>>,
}

/// The author of a message.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MessageSender {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
    /// `user`, `agent_bot` or `contact`.
    #[serde(default, rename = "type")]
    pub sender_type: Option<String>,
}

/// One page of the account-wide conversation listing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConversationsPage {
    pub conversations: Vec<Conversation>,
    /// `data.meta.all_count`, when present.
    pub all_count: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn conversation_tolerates_nulls_and_missing_fields() {
        let conv: Conversation = serde_json::from_value(json!({
            "id": 7,
            "status": "open",
            "labels": null,
            "custom_attributes": null,
            "meta": {"sender": {"id": 3, "name": "Maria", "custom_attributes": null}}
        }))
        .unwrap();
        assert_eq!(conv.id, 7);
        assert!(conv.labels.is_empty());
        assert!(conv.custom_attributes.is_empty());
        assert_eq!(conv.last_activity_at, 0);
        assert_eq!(
            conv.meta.sender.and_then(|s| s.name).as_deref(),
            Some("Maria")
        );
    }

    #[test]
    fn message_parses_attachments_and_sender_type() {
        let msg: Message = serde_json::from_value(json!({
            "id": 11,
            "content": null,
            "created_at": 1_700_000_000,
            "message_type": 0,
            "private": false,
            "sender": {"id": 3, "name": "Maria", "type": "contact"},
            "attachments": [{
                "id": 5,
                "file_type": "image",
                "data_url": "https://cdn.example.com/a.png",
                "extension": "png"
            }]
        }))
        .unwrap();
        assert_eq!(msg.content, None);
        assert_eq!(msg.sender.unwrap().sender_type.as_deref(), Some("contact"));
        let attachments = msg.attachments.unwrap();
        assert_eq!(attachments[0].file_type, "image");
        assert_eq!(attachments[0].file_name, None);
    }

    #[test]
    fn attribute_ignores_non_strings() {
        let mut attrs = Attributes::new();
        attrs.insert("empresa".into(), json!("Loja X"));
        attrs.insert("problema".into(), json!(42));
        assert_eq!(attribute(&attrs, "empresa"), Some("Loja X"));
        assert_eq!(attribute(&attrs, "problema"), None);
        assert_eq!(attribute(&attrs, "missing"), None);
    }
}
