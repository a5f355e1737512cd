// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.

use crate::diagnostic::ConfigError;
use crate::model::TicketdeskConfig;

/// Validate a deserialized configuration.
///
/// Collects every failure instead of stopping at the first one.
pub fn validate_config(config: &TicketdeskConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    let host = config.server.host.trim();
    if host.is_empty() {
        fail("server.host must not be empty".to_string());
    } else {
        let is_ip = host.parse::<std::net::IpAddr>().is_ok();
        let is_hostname = host
            .chars()
            .all(|c| c.is_alphanumeric() || c == '.' || c == '-');
        if !is_ip && !is_hostname {
            fail(format!(
                "server.host `{host}` is not a valid IP address or hostname"
            ));
        }
    }

    if config.server.port == 0 {
        fail("server.port must not be 0".to_string());
    }

    if config.storage.database_path.trim().is_empty() {
        fail("storage.database_path must not be empty".to_string());
    }

    if let Some(url) = &config.chatwoot.base_url
        && !(url.starts_with("http://") || url.starts_with("https://"))
    {
        fail(format!(
            "chatwoot.base_url `{url}` must start with http:// or https://"
        ));
    }

    if let Some(account) = &config.chatwoot.account_id
        && account.trim().is_empty()
    {
        fail("chatwoot.account_id must not be empty when set".to_string());
    }

    if config.chatwoot.request_timeout_secs == 0 {
        fail("chatwoot.request_timeout_secs must be at least 1".to_string());
    }

    if config.sync.max_per_page == 0 {
        fail("sync.max_per_page must be at least 1".to_string());
    }

    if config.sync.default_per_page == 0 || config.sync.default_per_page > config.sync.max_per_page
    {
        fail(format!(
            "sync.default_per_page must be between 1 and sync.max_per_page ({}), got {}",
            config.sync.max_per_page, config.sync.default_per_page
        ));
    }

    if config.sync.max_conversation_pages == 0 {
        fail("sync.max_conversation_pages must be at least 1".to_string());
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
