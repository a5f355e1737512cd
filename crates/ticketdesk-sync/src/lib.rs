// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Synchronization between the Chatwoot API and the local ticket cache.
//!
//! [`SyncOrchestrator`] serves listings from the cache, runs guarded
//! cold-start backfills and applies webhook refreshes.

pub mod events;
pub mod guard;
pub mod listing;
pub mod orchestrator;

pub use events::{EventDisposition, WebhookEvent};
pub use guard::{SyncGuard, SyncPermit};
pub use listing::{ListingOutcome, ListingQuery, PageRequest, TicketListing};
pub use orchestrator::{BackfillOutcome, BackfillReport, RefreshOutcome, SyncOrchestrator};
