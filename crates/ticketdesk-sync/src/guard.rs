// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Single-flight guard for full backfills.

use std::sync::atomic::{AtomicBool, Ordering};

/// Allows at most one full backfill at a time.
#[derive(Debug, Default)]
pub struct SyncGuard {
    running: AtomicBool,
}

impl SyncGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Take the guard, or `None` if a backfill already holds it.
    pub fn try_acquire(&self) -> Option<SyncPermit<'_>> {
        self.running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| SyncPermit { guard: self })
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }
}

/// Proof that the holder runs the backfill. Dropping it releases the guard,
/// including on early returns and panics.
#[derive(Debug)]
pub struct SyncPermit<'a> {
    guard: &'a SyncGuard,
}

impl Drop for SyncPermit<'_> {
    fn drop(&mut self) {
        self.guard.running.store(false, Ordering::Release);
    }
}
