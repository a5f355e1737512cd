// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP surface of ticketdesk.
//!
//! Serves cached ticket listings to the dashboard and receives Chatwoot
//! webhook deliveries. All cache decisions are delegated to
//! [`ticketdesk_sync::SyncOrchestrator`].

pub mod handlers;
pub mod server;

pub use server::{GatewayState, HealthState, build_router, start_server};
