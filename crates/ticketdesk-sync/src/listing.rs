// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Ticket listing requests and responses.

use serde::{Deserialize, Serialize};
use ticketdesk_config::model::SyncConfig;
use ticketdesk_core::{ConversationMap, Ticket};

/// Raw query parameters of a listing request.
///
/// Kept as strings so malformed numbers fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingQuery {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub per_page: Option<String>,
    #[serde(default, rename = "contactId")]
    pub contact_id: Option<String>,
}

/// A validated page request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// 1-indexed.
    pub page: u32,
    pub per_page: u32,
}

impl ListingQuery {
    pub fn page(page: u32, per_page: u32) -> Self {
        Self {
            page: Some(page.to_string()),
            per_page: Some(per_page.to_string()),
            contact_id: None,
        }
    }

    /// Page and size with defaults applied and `per_page` capped.
    pub fn page_request(&self, config: &SyncConfig) -> PageRequest {
        let page = parse(&self.page).filter(|p| *p > 0).unwrap_or(1);
        let per_page = parse(&self.per_page)
            .filter(|p| *p > 0)
            .unwrap_or(config.default_per_page)
            .min(config.max_per_page);
        PageRequest { page, per_page }
    }

    /// The contact filter, if a non-blank one was given.
    pub fn contact(&self) -> Option<&str> {
        self.contact_id
            .as_deref()
            .map(str::trim)
            .filter(|c| !c.is_empty())
    }
}

fn parse(value: &Option<String>) -> Option<u32> {
    value.as_deref().and_then(|v| v.trim().parse().ok())
}

/// One page of tickets with their message histories.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TicketListing {
    pub tickets: Vec<Ticket>,
    /// Histories keyed by ticket ID, for the tickets on this page.
    pub conversations: ConversationMap,
    pub total_tickets_count: u64,
}

/// Result of a listing request.
#[derive(Debug, Clone, PartialEq)]
pub enum ListingOutcome {
    Ready(TicketListing),
    /// The cache is empty and another request is already filling it.
    SyncInProgress,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(page: Option<&str>, per_page: Option<&str>) -> ListingQuery {
        ListingQuery {
            page: page.map(String::from),
            per_page: per_page.map(String::from),
            contact_id: None,
        }
    }

    #[test]
    fn defaults_apply_when_absent() {
        let config = SyncConfig::default();
        assert_eq!(
            query(None, None).page_request(&config),
            PageRequest {
                page: 1,
                per_page: 50
            }
        );
    }

    #[test]
    fn per_page_is_capped() {
        let config = SyncConfig::default();
        assert_eq!(query(Some("3"), Some("1000")).page_request(&config).per_page, 100);
        assert_eq!(query(Some("3"), Some("1000")).page_request(&config).page, 3);
    }

    #[test]
    fn junk_and_zero_fall_back() {
        let config = SyncConfig::default();
        let request = query(Some("0"), Some("abc")).page_request(&config);
        assert_eq!(request, PageRequest { page: 1, per_page: 50 });
        let request = query(Some("-2"), Some("0")).page_request(&config);
        assert_eq!(request, PageRequest { page: 1, per_page: 50 });
    }

    #[test]
    fn blank_contact_is_ignored() {
        let mut q = ListingQuery::default();
        q.contact_id = Some("  ".into());
        assert_eq!(q.contact(), None);
        q.contact_id = Some("17".into());
        assert_eq!(q.contact(), Some("17"));
    }

    #[test]
    fn listing_serializes_with_dashboard_keys() {
        let listing = TicketListing {
            total_tickets_count: 3,
            ..Default::default()
        };
        let json = serde_json::to_value(&listing).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"tickets": [], "conversations": {}, "totalTicketsCount": 3})
        );
    }
}
