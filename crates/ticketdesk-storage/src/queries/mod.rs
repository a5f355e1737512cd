// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed queries over the cache tables.

pub mod conversations;
pub mod tickets;
