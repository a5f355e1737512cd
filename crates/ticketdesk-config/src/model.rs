// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` so a misspelled key fails
//! at startup instead of being silently ignored.

use serde::{Deserialize, Serialize};

/// Top-level configuration.
///
/// Every section is optional and falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TicketdeskConfig {
    /// HTTP server settings.
    #[serde(default)]
    pub server: ServerConfig,

    /// Upstream Chatwoot account settings.
    #[serde(default)]
    pub chatwoot: ChatwootConfig,

    /// Local cache settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Sync and listing behavior.
    #[serde(default)]
    pub sync: SyncConfig,
}

/// HTTP server configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Address to bind.
    #[serde(default = "default_host")]
    pub host: String,

    /// Port to bind.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Chatwoot API configuration.
///
/// `base_url`, `account_id` and `api_token` have no defaults; `ticketdesk
/// serve` refuses to start without them.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ChatwootConfig {
    /// Instance root, e.g. `https://app.chatwoot.com`.
    #[serde(default)]
    pub base_url: Option<String>,

    /// Numeric account ID as it appears in API paths.
    #[serde(default, deserialize_with = "string_or_number")]
    pub account_id: Option<String>,

    /// Value of the `api_access_token` header.
    #[serde(default, deserialize_with = "string_or_number")]
    pub api_token: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

impl Default for ChatwootConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            account_id: None,
            api_token: None,
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

/// Accept a string or a bare number.
///
/// Environment providers parse `CHATWOOT_ACCOUNT_ID=7` as an integer, and
/// TOML users write `account_id = 7`.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Unsigned(u64),
        Signed(i64),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.map(|raw| match raw {
        Raw::Text(text) => text,
        Raw::Unsigned(n) => n.to_string(),
        Raw::Signed(n) => n.to_string(),
    }))
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// Enable WAL (Write-Ahead Logging) mode for SQLite.
    #[serde(default = "default_wal_mode")]
    pub wal_mode: bool,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            wal_mode: default_wal_mode(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("ticketdesk").join("tickets.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("tickets.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_wal_mode() -> bool {
    true
}

/// Sync orchestration and listing configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct SyncConfig {
    /// Page size used when the request carries no `per_page`.
    #[serde(default = "default_per_page")]
    pub default_per_page: u32,

    /// Upper bound applied to a requested `per_page`.
    #[serde(default = "default_max_per_page")]
    pub max_per_page: u32,

    /// Safety cap on conversation listing pages walked by one backfill.
    #[serde(default = "default_max_conversation_pages")]
    pub max_conversation_pages: u32,

    /// Look up each requester's contact record during a backfill so the
    /// company name can be resolved.
    #[serde(default = "default_true")]
    pub fetch_contact_details: bool,

    /// Report the upstream `meta.all_count` as the total on warm reads.
    /// When off the total is the local row count.
    #[serde(default)]
    pub reconcile_total_count: bool,

    /// Skip webhook writes whose `last_activity_at` is older than the cached row.
    #[serde(default = "default_true")]
    pub reject_stale_webhooks: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            default_per_page: default_per_page(),
            max_per_page: default_max_per_page(),
            max_conversation_pages: default_max_conversation_pages(),
            fetch_contact_details: true,
            reconcile_total_count: false,
            reject_stale_webhooks: true,
        }
    }
}

fn default_per_page() -> u32 {
    50
}

fn default_max_per_page() -> u32 {
    100
}

fn default_max_conversation_pages() -> u32 {
    1000
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let config = TicketdeskConfig::default();
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.sync.default_per_page, 50);
        assert_eq!(config.sync.max_per_page, 100);
        assert!(config.sync.fetch_contact_details);
        assert!(!config.sync.reconcile_total_count);
        assert!(config.sync.reject_stale_webhooks);
        assert!(config.chatwoot.base_url.is_none());
        assert!(config.storage.database_path.ends_with("tickets.db"));
    }

    #[test]
    fn sync_section_rejects_unknown_fields() {
        let toml_str = r#"
[sync]
per_pag = 10
"#;
        assert!(toml::from_str::<TicketdeskConfig>(toml_str).is_err());
    }

    #[test]
    fn account_id_accepts_integer_or_string() {
        let numeric: TicketdeskConfig = toml::from_str("[chatwoot]\naccount_id = 7\n").unwrap();
        assert_eq!(numeric.chatwoot.account_id.as_deref(), Some("7"));

        let quoted: TicketdeskConfig =
            toml::from_str("[chatwoot]\naccount_id = \"12\"\n").unwrap();
        assert_eq!(quoted.chatwoot.account_id.as_deref(), Some("12"));

        let absent: TicketdeskConfig = toml::from_str("[chatwoot]\n").unwrap();
        assert!(absent.chatwoot.account_id.is_none());
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let toml_str = r#"
[sync]
reconcile_total_count = true
"#;
        let config: TicketdeskConfig = toml::from_str(toml_str).unwrap();
        assert!(config.sync.reconcile_total_count);
        assert_eq!(config.sync.default_per_page, 50);
        assert!(config.sync.reject_stale_webhooks);
    }
}
