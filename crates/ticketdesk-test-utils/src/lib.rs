// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for ticketdesk integration tests.
//!
//! - [`MockHelpdesk`] - scripted upstream with call counters and a listing gate
//! - [`TestHarness`] - temp SQLite cache plus orchestrator over a mock helpdesk
//! - [`fixtures`] - upstream object builders

pub mod fixtures;
pub mod harness;
pub mod mock_helpdesk;

pub use harness::TestHarness;
pub use mock_helpdesk::MockHelpdesk;
