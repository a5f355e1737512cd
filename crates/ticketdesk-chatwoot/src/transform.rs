// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mapping from Chatwoot objects to dashboard tickets and messages.
//!
//! Everything here is pure. Display strings are Portuguese because the
//! dashboard renders them verbatim.

use std::collections::HashMap;

use chrono::DateTime;
use ticketdesk_core::{ConversationMessage, Ticket};

use crate::types::{Contact, Conversation, Message, attribute, message_type};

/// Maximum subject length, in characters, before truncation.
pub const SUBJECT_MAX_CHARS: usize = 80;

pub const NO_SUBJECT: &str = "Assunto não especificado";
pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN_CONTACT: &str = "Contato Desconhecido";
/// Requester name used in message sender labels when the conversation has none.
pub const DEFAULT_CONTACT: &str = "Contato";
pub const SYSTEM_SENDER: &str = "Sistema";

const LOJA_PARADA_LABEL: &str = "loja-parada";

/// Treat empty strings like missing values.
fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

/// Build a ticket summary from a conversation.
///
/// `contact` is the looked-up contact record when one was fetched; otherwise
/// the conversation's embedded sender is used for company resolution.
pub fn conversation_to_ticket(conversation: &Conversation, contact: Option<&Contact>) -> Ticket {
    let subject = non_empty(attribute(&conversation.custom_attributes, "problema"))
        .or_else(|| non_empty(conversation.messages.first().and_then(|m| m.content.as_deref())))
        .unwrap_or(NO_SUBJECT);

    let (status, status_class) = status_label(&conversation.status, &conversation.labels);
    let meta = &conversation.meta;
    let company_source = contact.or(meta.sender.as_ref());

    Ticket {
        id: conversation.id.to_string(),
        status,
        status_class,
        inbox: non_empty(meta.inbox.as_ref().and_then(|i| i.name.as_deref()))
            .unwrap_or(NOT_AVAILABLE)
            .to_string(),
        subject: truncate_subject(subject),
        agent: non_empty(meta.assignee.as_ref().and_then(|a| a.name.as_deref()))
            .unwrap_or(NOT_AVAILABLE)
            .to_string(),
        date_created: format_date(conversation.created_at),
        last_activity_at: conversation.last_activity_at,
        contact_name: non_empty(meta.sender.as_ref().and_then(|s| s.name.as_deref()))
            .unwrap_or(UNKNOWN_CONTACT)
            .to_string(),
        company: company_source
            .and_then(company_name)
            .unwrap_or(NOT_AVAILABLE)
            .to_string(),
        description: subject.to_string(),
    }
}

/// Company name from `company.name`, `additional_attributes.company_name`
/// or `custom_attributes.empresa`, in that order.
pub fn company_name(contact: &Contact) -> Option<&str> {
    non_empty(contact.company.as_ref().and_then(|c| c.name.as_deref()))
        .or_else(|| non_empty(attribute(&contact.additional_attributes, "company_name")))
        .or_else(|| non_empty(attribute(&contact.custom_attributes, "empresa")))
}

/// Requester name for message sender labels.
pub fn message_contact_name(conversation: &Conversation) -> &str {
    non_empty(
        conversation
            .meta
            .sender
            .as_ref()
            .and_then(|s| s.name.as_deref()),
    )
    .unwrap_or(DEFAULT_CONTACT)
}

/// Display label and CSS class for a conversation status.
///
/// The `loja-parada` label wins over any status.
pub fn status_label(status: &str, labels: &[String]) -> (String, String) {
    if labels.iter().any(|l| l == LOJA_PARADA_LABEL) {
        return ("Loja Parada".to_string(), "status-loja-parada".to_string());
    }

    let lower = status.to_lowercase();
    let known = match lower.as_str() {
        "resolved" => Some(("Resolvido", "status-resolved")),
        "pending" => Some(("Pendente", "status-on-hold")),
        "open" => Some(("Aberto", "status-aberto")),
        "snoozed" | "on-hold" | "on_hold" | "on hold" => Some(("Adiado", "status-on-hold")),
        _ => None,
    };

    match known {
        Some((label, class)) => (label.to_string(), class.to_string()),
        None => (capitalize(status), format!("status-{lower}")),
    }
}

fn capitalize(value: &str) -> String {
    let mut chars = value.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Cut a subject to [`SUBJECT_MAX_CHARS`] characters, appending `...` when
/// anything was removed.
pub fn truncate_subject(subject: &str) -> String {
    match subject.char_indices().nth(SUBJECT_MAX_CHARS) {
        Some((cut, _)) => format!("{}...", &subject[..cut]),
        None => subject.to_string(),
    }
}

/// `DD/MM/YYYY` in UTC.
pub fn format_date(epoch_secs: i64) -> String {
    DateTime::from_timestamp(epoch_secs, 0)
        .map(|d| d.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// Transform one upstream message.
pub fn transform_message(message: &Message, contact_name: &str) -> ConversationMessage {
    let is_system = matches!(
        message.message_type,
        message_type::ACTIVITY | message_type::TEMPLATE
    ) || message.private;

    let sender = match (&message.sender, is_system) {
        (Some(sender), false) => {
            let name = non_empty(sender.name.as_deref());
            match message.message_type {
                message_type::INCOMING => format!("{} (Cliente)", name.unwrap_or(contact_name)),
                message_type::OUTGOING => format!("{} (Agente)", name.unwrap_or("Agente")),
                _ => name.unwrap_or(SYSTEM_SENDER).to_string(),
            }
        }
        _ => SYSTEM_SENDER.to_string(),
    };

    let content = message.content.as_deref().unwrap_or_default();
    let first_attachment = message.attachments.as_ref().and_then(|a| a.first());
    let text = match first_attachment {
        Some(attachment) => {
            let file_name = non_empty(attachment.file_name.as_deref());
            let placeholder = match attachment.file_type.as_str() {
                "image" => format!("[Imagem: {}]", file_name.unwrap_or("imagem")),
                "audio" => format!("[Áudio: {}]", file_name.unwrap_or("áudio")),
                "video" => format!("[Vídeo: {}]", file_name.unwrap_or("vídeo")),
                "file" => format!("[Arquivo: {}]", file_name.unwrap_or("documento")),
                _ => format!("[Anexo: {}]", file_name.unwrap_or("mídia")),
            };
            if content.is_empty() {
                placeholder
            } else {
                format!("{content} {placeholder}")
            }
        }
        None if content.is_empty() && is_system => "(Ação do sistema ou nota interna)".to_string(),
        None if content.is_empty() => "(Mensagem sem conteúdo)".to_string(),
        None => content.to_string(),
    };

    ConversationMessage {
        id: message.id,
        sender,
        text,
        timestamp: message.created_at,
        is_system_message: is_system,
        attachments: message.attachments.clone(),
    }
}

/// Keep one message per ID (the last one seen) ordered by
/// `(timestamp, id)`.
pub fn dedupe_messages(messages: Vec<ConversationMessage>) -> Vec<ConversationMessage> {
    let mut by_id: HashMap<i64, ConversationMessage> = HashMap::with_capacity(messages.len());
    for message in messages {
        by_id.insert(message.id, message);
    }
    let mut unique: Vec<ConversationMessage> = by_id.into_values().collect();
    unique.sort_by_key(|m| (m.timestamp, m.id));
    unique
}

/// Transform a fetched message history into the stored form.
pub fn transform_messages(messages: &[Message], contact_name: &str) -> Vec<ConversationMessage> {
    dedupe_messages(
        messages
            .iter()
            .map(|m| transform_message(m, contact_name))
            .collect(),
    )
}
