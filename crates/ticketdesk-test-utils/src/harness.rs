// SPDX-FileCopyrightText: 2026 Ticketdesk Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness wiring a temp SQLite cache, a mock helpdesk and an orchestrator.

use std::sync::Arc;

use ticketdesk_config::model::{StorageConfig, SyncConfig, TicketdeskConfig};
use ticketdesk_core::{StorageAdapter, TicketdeskError};
use ticketdesk_storage::SqliteStorage;
use ticketdesk_sync::SyncOrchestrator;

use crate::mock_helpdesk::MockHelpdesk;

/// Builder for [`TestHarness`].
pub struct TestHarnessBuilder {
    helpdesk: MockHelpdesk,
    sync: SyncConfig,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            helpdesk: MockHelpdesk::new(),
            sync: SyncConfig::default(),
        }
    }

    /// Use a scripted helpdesk instead of an empty one.
    pub fn with_helpdesk(mut self, helpdesk: MockHelpdesk) -> Self {
        self.helpdesk = helpdesk;
        self
    }

    pub fn with_sync_config(mut self, sync: SyncConfig) -> Self {
        self.sync = sync;
        self
    }

    /// Open the temp database and wire everything together.
    pub async fn build(self) -> Result<TestHarness, TicketdeskError> {
        let temp_dir =
            tempfile::TempDir::new().map_err(|e| TicketdeskError::Storage { source: e.into() })?;
        let db_path = temp_dir.path().join("tickets.db");

        let storage_config = StorageConfig {
            database_path: db_path.to_string_lossy().into_owned(),
            wal_mode: true,
        };
        let storage = Arc::new(SqliteStorage::new(storage_config.clone()));
        storage.initialize().await?;

        let helpdesk = Arc::new(self.helpdesk);
        let orchestrator = Arc::new(SyncOrchestrator::new(
            storage.clone(),
            helpdesk.clone(),
            self.sync.clone(),
        ));

        let config = TicketdeskConfig {
            storage: storage_config,
            sync: self.sync,
            ..TicketdeskConfig::default()
        };

        Ok(TestHarness {
            helpdesk,
            storage,
            orchestrator,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A cache, a mock upstream and the orchestrator between them.
pub struct TestHarness {
    pub helpdesk: Arc<MockHelpdesk>,
    /// SQLite cache (temp DB, removed on drop).
    pub storage: Arc<SqliteStorage>,
    pub orchestrator: Arc<SyncOrchestrator>,
    pub config: TicketdeskConfig,
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    /// Harness over the given helpdesk with default settings.
    pub async fn with_helpdesk(helpdesk: MockHelpdesk) -> Result<Self, TicketdeskError> {
        Self::builder().with_helpdesk(helpdesk).build().await
    }
}
