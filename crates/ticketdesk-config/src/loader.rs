// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Supports the XDG hierarchy `./ticketdesk.toml` > `~/.config/ticketdesk/ticketdesk.toml`
//! > `/etc/ticketdesk/ticketdesk.toml`, the dashboard's historical
//! `CHATWOOT_*` variables, and `TICKETDESK_*` overrides.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::TicketdeskConfig;

/// System-wide config file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/ticketdesk/ticketdesk.toml";

/// Config file looked up in the working directory.
pub const LOCAL_CONFIG_PATH: &str = "ticketdesk.toml";

/// Top-level sections, used to turn `TICKETDESK_SYNC_MAX_PER_PAGE` into
/// `sync.max_per_page` without splitting inside key names.
const SECTIONS: &[&str] = &["server", "chatwoot", "storage", "sync"];

/// Variables the dashboard was originally deployed with.
const LEGACY_ENV: &[(&str, &str)] = &[
    ("chatwoot_url", "chatwoot.base_url"),
    ("chatwoot_account_id", "chatwoot.account_id"),
    ("chatwoot_api_token", "chatwoot.api_token"),
];

/// Path of the per-user config file, if a config dir exists.
pub fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("ticketdesk").join("ticketdesk.toml"))
}

/// Load configuration from the standard hierarchy with env var overrides.
///
/// Merge order (later overrides earlier):
/// 1. Compiled defaults
/// 2. `/etc/ticketdesk/ticketdesk.toml`
/// 3. `~/.config/ticketdesk/ticketdesk.toml`
/// 4. `./ticketdesk.toml`
/// 5. `CHATWOOT_URL`, `CHATWOOT_ACCOUNT_ID`, `CHATWOOT_API_TOKEN`
/// 6. `TICKETDESK_*` environment variables
pub fn load_config() -> Result<TicketdeskConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no environment).
pub fn load_config_from_str(toml_content: &str) -> Result<TicketdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TicketdeskConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from one explicit file, with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<TicketdeskConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(TicketdeskConfig::default()))
        .merge(Toml::file(path))
        .merge(legacy_env_provider())
        .merge(env_provider())
        .extract()
}

/// Build the layered Figment before extraction.
pub fn build_figment() -> Figment {
    Figment::new()
        .merge(Serialized::defaults(TicketdeskConfig::default()))
        .merge(Toml::file(SYSTEM_CONFIG_PATH))
        .merge(Toml::file(user_config_path().unwrap_or_default()))
        .merge(Toml::file(LOCAL_CONFIG_PATH))
        .merge(legacy_env_provider())
        .merge(env_provider())
}

/// `TICKETDESK_*` provider with explicit section mapping.
///
/// `Env::split("_")` would turn `TICKETDESK_CHATWOOT_API_TOKEN` into
/// `chatwoot.api.token`; only the first segment is a section.
fn env_provider() -> Env {
    Env::prefixed("TICKETDESK_").map(|key| map_env_key(key.as_str()).into())
}

/// Maps the unprefixed Chatwoot variables onto the `[chatwoot]` section.
fn legacy_env_provider() -> Env {
    let names: Vec<&str> = LEGACY_ENV.iter().map(|(name, _)| *name).collect();
    Env::raw().only(&names).map(|key| {
        let lowered = key.as_str().to_ascii_lowercase();
        LEGACY_ENV
            .iter()
            .find(|(name, _)| *name == lowered)
            .map(|(_, target)| (*target).to_string())
            .unwrap_or(lowered)
            .into()
    })
}

/// Turn a lowercased, prefix-stripped variable name into a dotted key.
pub fn map_env_key(key: &str) -> String {
    let key = key.to_ascii_lowercase();
    for section in SECTIONS {
        if let Some(rest) = key.strip_prefix(section).and_then(|r| r.strip_prefix('_')) {
            return format!("{section}.{rest}");
        }
    }
    key
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_split_only_at_the_section() {
        assert_eq!(map_env_key("chatwoot_api_token"), "chatwoot.api_token");
        assert_eq!(map_env_key("sync_max_per_page"), "sync.max_per_page");
        assert_eq!(map_env_key("STORAGE_WAL_MODE"), "storage.wal_mode");
        assert_eq!(map_env_key("server_log_level"), "server.log_level");
    }

    #[test]
    fn unknown_sections_pass_through() {
        assert_eq!(map_env_key("whatever_key"), "whatever_key");
    }

    #[test]
    fn ticketdesk_env_overrides_toml() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("ticketdesk.toml", "[server]\nport = 4000\n")?;
            jail.set_env("TICKETDESK_SERVER_PORT", "5000");
            jail.set_env("TICKETDESK_CHATWOOT_API_TOKEN", "tok-env");
            let config = load_config_from_path(Path::new("ticketdesk.toml"))
                .expect("config should load");
            assert_eq!(config.server.port, 5000);
            assert_eq!(config.chatwoot.api_token.as_deref(), Some("tok-env"));
            Ok(())
        });
    }

    #[test]
    fn legacy_chatwoot_variables_are_honored() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("ticketdesk.toml", "")?;
            jail.set_env("CHATWOOT_URL", "https://chat.example.com");
            jail.set_env("CHATWOOT_ACCOUNT_ID", "7");
            jail.set_env("CHATWOOT_API_TOKEN", "legacy");
            let config = load_config_from_path(Path::new("ticketdesk.toml"))
                .expect("config should load");
            assert_eq!(
                config.chatwoot.base_url.as_deref(),
                Some("https://chat.example.com")
            );
            assert_eq!(config.chatwoot.account_id.as_deref(), Some("7"));
            assert_eq!(config.chatwoot.api_token.as_deref(), Some("legacy"));
            Ok(())
        });
    }

    #[test]
    fn numeric_prefixed_account_id_loads() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("ticketdesk.toml", "")?;
            jail.set_env("TICKETDESK_CHATWOOT_ACCOUNT_ID", "42");
            let config = load_config_from_path(Path::new("ticketdesk.toml"))
                .expect("config should load");
            assert_eq!(config.chatwoot.account_id.as_deref(), Some("42"));
            Ok(())
        });
    }

    #[test]
    fn prefixed_variable_wins_over_legacy_one() {
        figment::Jail::expect_with(|jail| {
            jail.create_file("ticketdesk.toml", "")?;
            jail.set_env("CHATWOOT_API_TOKEN", "legacy");
            jail.set_env("TICKETDESK_CHATWOOT_API_TOKEN", "preferred");
            let config = load_config_from_path(Path::new("ticketdesk.toml"))
                .expect("config should load");
            assert_eq!(config.chatwoot.api_token.as_deref(), Some("preferred"));
            Ok(())
        });
    }
}
