// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for ticketdesk.

use thiserror::Error;

/// The error type returned by the cache store, the upstream client and the
/// sync orchestrator.
///
/// Upstream non-success statuses are not errors: the client logs them and
/// reports an abandoned fetch. Only transport-independent failures that
/// should abort a whole sync end up here.
#[derive(Debug, Error)]
pub enum TicketdeskError {
    /// Configuration errors (missing upstream credentials, invalid values).
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage backend errors (connection, query failure, blob serialization).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Upstream helpdesk errors that are not a plain non-success status
    /// (client construction, unreadable body).
    #[error("upstream error: {message}")]
    Upstream {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The upstream answered successfully but with a shape we cannot use,
    /// e.g. a non-array where a list of conversations was expected.
    #[error("malformed upstream payload: {0}")]
    MalformedPayload(String),

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl TicketdeskError {
    /// Wraps any error as a storage failure.
    pub fn storage<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Storage {
            source: Box::new(err),
        }
    }
}
