// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! ticketdesk - Chatwoot ticket history cache and dashboard API.
//!
//! This is the binary entry point.

#[cfg(not(target_env = "msvc"))]
use tikv_jemallocator::Jemalloc;

#[cfg(not(target_env = "msvc"))]
#[global_allocator]
static GLOBAL: Jemalloc = Jemalloc;

mod serve;
mod shutdown;
mod status;
mod sync;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use ticketdesk_config::TicketdeskConfig;

/// ticketdesk - Chatwoot ticket history cache and dashboard API.
#[derive(Parser, Debug)]
#[command(name = "ticketdesk", version, about, long_about = None)]
struct Cli {
    /// Read configuration from this file instead of the standard locations.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the HTTP server.
    Serve,
    /// Run one full backfill from Chatwoot into the cache.
    Sync {
        /// Clear the cache before syncing.
        #[arg(long)]
        reset: bool,
    },
    /// Show whether the server is running and how many tickets are cached.
    Status {
        /// Output as JSON.
        #[arg(long)]
        json: bool,
        /// Disable colors.
        #[arg(long)]
        plain: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> TicketdeskConfig {
    let loaded = match path {
        Some(path) => ticketdesk_config::load_and_validate_path(path),
        None => ticketdesk_config::load_and_validate(),
    };
    match loaded {
        Ok(config) => config,
        Err(errors) => {
            ticketdesk_config::render_errors(&errors);
            std::process::exit(1);
        }
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let Some(command) = cli.command else {
        println!("ticketdesk: use --help for available commands");
        return;
    };

    let config = load_config(cli.config.as_ref());

    let result = match command {
        Commands::Serve => serve::run_serve(config).await,
        Commands::Sync { reset } => sync::run_sync(config, reset).await,
        Commands::Status { json, plain } => status::run_status(&config, json, plain).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    #[cfg(not(target_env = "msvc"))]
    fn jemalloc_is_active() {
        // Only jemalloc supports advancing the epoch.
        use tikv_jemalloc_ctl::{epoch, stats};
        epoch::advance().unwrap();
        let allocated = stats::allocated::read().unwrap();
        assert!(allocated > 0, "jemalloc should report non-zero allocation");
    }

    #[test]
    fn cli_parses_sync_reset() {
        let cli = Cli::try_parse_from(["ticketdesk", "sync", "--reset"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Sync { reset: true })));
    }

    #[test]
    fn cli_accepts_global_config_path() {
        let cli =
            Cli::try_parse_from(["ticketdesk", "status", "--json", "--config", "/tmp/t.toml"])
                .unwrap();
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/t.toml")));
        assert!(matches!(
            cli.command,
            Some(Commands::Status {
                json: true,
                plain: false
            })
        ));
    }

    #[test]
    fn binary_loads_config_defaults() {
        let config = ticketdesk_config::load_and_validate_str("")
            .expect("default config should be valid");
        assert_eq!(config.server.port, 3000);
    }
}
