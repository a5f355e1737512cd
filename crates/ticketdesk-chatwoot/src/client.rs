// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the Chatwoot application API.
//!
//! Provides [`ChatwootClient`], which builds account-scoped URLs, sends the
//! `api_access_token` header and unwraps the response envelopes. Failed calls
//! are logged and abandoned; nothing is retried.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;
use reqwest::header::{ACCEPT, HeaderMap, HeaderValue};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use ticketdesk_config::model::ChatwootConfig;
use ticketdesk_core::{AdapterType, HealthStatus, PluginAdapter, TicketdeskError};

use crate::source::HelpdeskSource;
use crate::types::{Contact, Conversation, ConversationsPage, Message};

/// Header carrying the Chatwoot user or bot access token.
const TOKEN_HEADER: &str = "api_access_token";

/// HTTP client bound to one Chatwoot account.
#[derive(Debug, Clone)]
pub struct ChatwootClient {
    client: reqwest::Client,
    /// `{base_url}/api/v1/accounts/{account_id}`
    account_root: Url,
    /// `{base_url}/api/v1/profile`, used for health checks.
    profile_url: Url,
}

impl ChatwootClient {
    /// Creates a client from the `[chatwoot]` config section.
    ///
    /// Fails with [`TicketdeskError::Config`] when the base URL, account ID
    /// or token is missing or unusable.
    pub fn new(config: &ChatwootConfig) -> Result<Self, TicketdeskError> {
        let base_url = required(&config.base_url, "chatwoot.base_url")?;
        let account_id = required(&config.account_id, "chatwoot.account_id")?;
        let api_token = required(&config.api_token, "chatwoot.api_token")?;

        let base = Url::parse(base_url)
            .map_err(|e| TicketdeskError::Config(format!("invalid chatwoot.base_url: {e}")))?;
        let account_root = with_segments(&base, &["api", "v1", "accounts", account_id])
            .ok_or_else(|| {
                TicketdeskError::Config(format!("chatwoot.base_url `{base_url}` cannot be a base"))
            })?;
        let profile_url = with_segments(&base, &["api", "v1", "profile"]).ok_or_else(|| {
            TicketdeskError::Config(format!("chatwoot.base_url `{base_url}` cannot be a base"))
        })?;

        let mut headers = HeaderMap::new();
        let mut token = HeaderValue::from_str(api_token).map_err(|e| {
            TicketdeskError::Config(format!("invalid chatwoot.api_token header value: {e}"))
        })?;
        token.set_sensitive(true);
        headers.insert(TOKEN_HEADER, token);
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()
            .map_err(|e| TicketdeskError::Upstream {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            account_root,
            profile_url,
        })
    }

    /// Account-scoped URL with each segment percent-encoded.
    fn account_url(&self, segments: &[&str]) -> Result<Url, TicketdeskError> {
        with_segments(&self.account_root, segments).ok_or_else(|| {
            TicketdeskError::Internal(format!("cannot extend {}", self.account_root))
        })
    }

    /// GET a JSON document.
    ///
    /// `Ok(None)` when the call was abandoned. A success response that is not
    /// JSON is a [`TicketdeskError::MalformedPayload`].
    async fn get_json(&self, url: Url) -> Result<Option<Value>, TicketdeskError> {
        let response = match self.client.get(url.clone()).send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(url = %url, error = %e, "upstream request failed, abandoning");
                return Ok(None);
            }
        };

        let status = response.status();
        debug!(status = %status, url = %url, "upstream response received");
        if !status.is_success() {
            warn!(status = %status, url = %url, "upstream returned non-success status, abandoning");
            return Ok(None);
        }

        let body = match response.text().await {
            Ok(body) => body,
            Err(e) => {
                warn!(url = %url, error = %e, "failed to read upstream body, abandoning");
                return Ok(None);
            }
        };
        serde_json::from_str(&body)
            .map(Some)
            .map_err(|e| TicketdeskError::MalformedPayload(format!("{}: {e}", url.path())))
    }
}

fn required<'a>(value: &'a Option<String>, key: &str) -> Result<&'a str, TicketdeskError> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| TicketdeskError::Config(format!("{key} is not set")))
}

fn with_segments(base: &Url, segments: &[&str]) -> Option<Url> {
    let mut url = base.clone();
    url.path_segments_mut().ok()?.pop_if_empty().extend(segments);
    Some(url)
}

/// Remove the array at `pointer` from `value`, if there is one.
fn take_array(value: &mut Value, pointer: &str) -> Option<Vec<Value>> {
    match value.pointer_mut(pointer).map(Value::take) {
        Some(Value::Array(items)) => Some(items),
        _ => None,
    }
}

fn decode<T: DeserializeOwned>(value: Value, what: &str) -> Result<T, TicketdeskError> {
    serde_json::from_value(value)
        .map_err(|e| TicketdeskError::MalformedPayload(format!("{what}: {e}")))
}

/// Unwrap `{data: {meta: {all_count}, payload: [...]}}`.
pub fn parse_conversations_page(mut body: Value) -> Result<ConversationsPage, TicketdeskError> {
    let all_count = body.pointer("/data/meta/all_count").and_then(Value::as_u64);
    let items = take_array(&mut body, "/data/payload").ok_or_else(|| {
        TicketdeskError::MalformedPayload(
            "conversation listing: data.payload is not an array".into(),
        )
    })?;
    Ok(ConversationsPage {
        conversations: decode(Value::Array(items), "conversation listing")?,
        all_count,
    })
}

/// Unwrap `{payload: [...]}` from the contact conversations endpoint.
pub fn parse_contact_conversations(mut body: Value) -> Result<Vec<Conversation>, TicketdeskError> {
    let items = take_array(&mut body, "/payload").ok_or_else(|| {
        TicketdeskError::MalformedPayload("contact conversations: payload is not an array".into())
    })?;
    decode(Value::Array(items), "contact conversations")
}

/// A conversation detail, bare or wrapped in `{payload: {...}}`.
pub fn parse_conversation(mut body: Value) -> Result<Conversation, TicketdeskError> {
    let wrapped = body
        .get_mut("payload")
        .filter(|payload| payload.is_object())
        .map(Value::take);
    decode(wrapped.unwrap_or(body), "conversation detail")
}

/// Unwrap `{payload: [...]}` or `{data: {payload: [...]}}`.
pub fn parse_messages(mut body: Value) -> Result<Vec<Message>, TicketdeskError> {
    let items = take_array(&mut body, "/payload")
        .or_else(|| take_array(&mut body, "/data/payload"))
        .ok_or_else(|| {
            TicketdeskError::MalformedPayload("message listing: payload is not an array".into())
        })?;
    decode(Value::Array(items), "message listing")
}

/// Unwrap `{payload: {...}}` from the contact endpoint.
pub fn parse_contact(mut body: Value) -> Result<Contact, TicketdeskError> {
    let payload = body
        .get_mut("payload")
        .filter(|payload| payload.is_object())
        .map(Value::take)
        .ok_or_else(|| TicketdeskError::MalformedPayload("contact: payload is not an object".into()))?;
    decode(payload, "contact")
}

#[async_trait]
impl PluginAdapter for ChatwootClient {
    fn name(&self) -> &str {
        "chatwoot"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Helpdesk
    }

    async fn health_check(&self) -> Result<HealthStatus, TicketdeskError> {
        match self.client.get(self.profile_url.clone()).send().await {
            Ok(response) if response.status().is_success() => Ok(HealthStatus::Healthy),
            Ok(response) => Ok(HealthStatus::Unhealthy(format!(
                "profile endpoint returned {}",
                response.status()
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(format!("unreachable: {e}"))),
        }
    }

    async fn shutdown(&self) -> Result<(), TicketdeskError> {
        Ok(())
    }
}

#[async_trait]
impl HelpdeskSource for ChatwootClient {
    async fn conversations_page(
        &self,
        page: u32,
    ) -> Result<Option<ConversationsPage>, TicketdeskError> {
        let mut url = self.account_url(&["conversations"])?;
        url.query_pairs_mut()
            .append_pair("status", "all")
            .append_pair("sort", "-last_activity_at")
            .append_pair("page", &page.to_string());
        match self.get_json(url).await? {
            Some(body) => parse_conversations_page(body).map(Some),
            None => Ok(None),
        }
    }

    async fn contact_conversations(
        &self,
        contact_id: &str,
    ) -> Result<Option<Vec<Conversation>>, TicketdeskError> {
        let url = self.account_url(&["contacts", contact_id, "conversations"])?;
        match self.get_json(url).await? {
            Some(body) => parse_contact_conversations(body).map(Some),
            None => Ok(None),
        }
    }

    async fn conversation(&self, id: i64) -> Result<Option<Conversation>, TicketdeskError> {
        let url = self.account_url(&["conversations", &id.to_string()])?;
        match self.get_json(url).await? {
            Some(body) => parse_conversation(body).map(Some),
            None => Ok(None),
        }
    }

    async fn messages_before(
        &self,
        conversation_id: i64,
        before: Option<i64>,
    ) -> Result<Option<Vec<Message>>, TicketdeskError> {
        let mut url =
            self.account_url(&["conversations", &conversation_id.to_string(), "messages"])?;
        if let Some(before) = before {
            url.query_pairs_mut()
                .append_pair("before", &before.to_string());
        }
        match self.get_json(url).await? {
            Some(body) => parse_messages(body).map(Some),
            None => Ok(None),
        }
    }

    async fn contact(&self, id: i64) -> Result<Option<Contact>, TicketdeskError> {
        let url = self.account_url(&["contacts", &id.to_string()])?;
        match self.get_json(url).await? {
            Some(body) => parse_contact(body).map(Some),
            None => Ok(None),
        }
    }
}
