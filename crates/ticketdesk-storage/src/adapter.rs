// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite implementation of the StorageAdapter trait.

use async_trait::async_trait;
use tokio::sync::OnceCell;
use tracing::debug;

use ticketdesk_config::model::StorageConfig;
use ticketdesk_core::{
    AdapterType, ConversationMap, ConversationMessage, HealthStatus, PluginAdapter,
    StorageAdapter, Ticket, TicketdeskError,
};

use crate::database::Database;
use crate::queries;

/// SQLite-backed ticket cache.
///
/// The database is opened lazily by [`StorageAdapter::initialize`]; every
/// other operation fails until then.
pub struct SqliteStorage {
    config: StorageConfig,
    db: OnceCell<Database>,
}

impl SqliteStorage {
    /// Create a storage adapter for the configured database file.
    pub fn new(config: StorageConfig) -> Self {
        Self {
            config,
            db: OnceCell::new(),
        }
    }

    fn db(&self) -> Result<&Database, TicketdeskError> {
        self.db.get().ok_or_else(|| TicketdeskError::Storage {
            source: "storage not initialized -- call initialize() first".into(),
        })
    }

    /// Fetch one cached ticket summary.
    pub async fn get_ticket(&self, id: &str) -> Result<Option<Ticket>, TicketdeskError> {
        queries::tickets::get_ticket(self.db()?, id).await
    }
}

#[async_trait]
impl PluginAdapter for SqliteStorage {
    fn name(&self) -> &str {
        "sqlite"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Storage
    }

    async fn health_check(&self) -> Result<HealthStatus, TicketdeskError> {
        let db = self.db()?;
        db.connection()
            .call(|conn| -> Result<(), rusqlite::Error> {
                conn.execute_batch("SELECT 1;")?;
                Ok(())
            })
            .await
            .map_err(crate::database::map_tr_err)?;
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), TicketdeskError> {
        if let Some(db) = self.db.get() {
            db.checkpoint().await?;
            debug!("shutdown: WAL checkpoint complete");
        }
        Ok(())
    }
}

#[async_trait]
impl StorageAdapter for SqliteStorage {
    async fn initialize(&self) -> Result<(), TicketdeskError> {
        let db = Database::open(&self.config.database_path, self.config.wal_mode).await?;
        self.db.set(db).map_err(|_| TicketdeskError::Storage {
            source: "storage already initialized".into(),
        })?;
        debug!(path = %self.config.database_path, "SQLite storage initialized");
        Ok(())
    }

    async fn close(&self) -> Result<(), TicketdeskError> {
        self.db()?.checkpoint().await?;
        debug!("WAL checkpoint complete");
        Ok(())
    }

    // --- Tickets ---

    async fn upsert_ticket(&self, ticket: &Ticket) -> Result<(), TicketdeskError> {
        queries::tickets::upsert_ticket(self.db()?, ticket).await
    }

    async fn upsert_tickets(&self, tickets: &[Ticket]) -> Result<(), TicketdeskError> {
        queries::tickets::upsert_tickets(self.db()?, tickets).await
    }

    async fn upsert_ticket_if_newer(&self, ticket: &Ticket) -> Result<bool, TicketdeskError> {
        queries::tickets::upsert_ticket_if_newer(self.db()?, ticket).await
    }

    async fn list_tickets(&self, page: u32, per_page: u32) -> Result<Vec<Ticket>, TicketdeskError> {
        queries::tickets::list_tickets(self.db()?, page, per_page).await
    }

    async fn count_tickets(&self) -> Result<u64, TicketdeskError> {
        queries::tickets::count_tickets(self.db()?).await
    }

    // --- Conversations ---

    async fn upsert_conversation(
        &self,
        ticket_id: &str,
        messages: &[ConversationMessage],
    ) -> Result<(), TicketdeskError> {
        queries::conversations::upsert_conversation(self.db()?, ticket_id, messages).await
    }

    async fn upsert_conversations(
        &self,
        conversations: &ConversationMap,
    ) -> Result<(), TicketdeskError> {
        queries::conversations::upsert_conversations(self.db()?, conversations).await
    }

    async fn get_conversation(
        &self,
        ticket_id: &str,
    ) -> Result<Option<Vec<ConversationMessage>>, TicketdeskError> {
        queries::conversations::get_conversation(self.db()?, ticket_id).await
    }

    async fn get_conversations_by_ids(
        &self,
        ticket_ids: &[String],
    ) -> Result<ConversationMap, TicketdeskError> {
        queries::conversations::get_conversations_by_ids(self.db()?, ticket_ids).await
    }

    async fn clear(&self) -> Result<(), TicketdeskError> {
        queries::conversations::clear(self.db()?).await
    }
}
