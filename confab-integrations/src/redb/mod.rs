//! Redb is a simple, portable, high-performance, ACID, embedded key-value
//! store.
//!
//! Used here as the client-side store for settings and chat transcripts,
//! without the need for external services. Records are stored as JSON strings
//! in one table per record kind.

use anyhow::Result;
use std::{path::PathBuf, sync::Arc};

use derive_builder::Builder;
use redb::TableDefinition;

mod store;

pub(crate) const SETTINGS_TABLE: TableDefinition<String, String> =
    TableDefinition::new("settings");
pub(crate) const CHATS_TABLE: TableDefinition<String, String> = TableDefinition::new("chats");
pub(crate) const MESSAGES_TABLE: TableDefinition<String, String> =
    TableDefinition::new("messages");

#[derive(Clone, Builder)]
#[builder(build_fn(error = "anyhow::Error"))]
pub struct Redb {
    #[builder(setter(into), default = "Arc::new(self.default_database()?)")]
    database: Arc<redb::Database>,

    /// Path to the database, required if no database override is provided
    #[builder(setter(into, strip_option), default)]
    database_path: Option<PathBuf>,
}

impl std::fmt::Debug for Redb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Redb")
            .field("database", &self.database)
            .field("database_path", &self.database_path)
            .finish()
    }
}

impl Redb {
    pub fn builder() -> RedbBuilder {
        RedbBuilder::default()
    }
}

impl RedbBuilder {
    fn default_database(&self) -> Result<redb::Database> {
        let db = redb::Database::create(
            self.database_path
                .clone()
                .flatten()
                .ok_or(anyhow::anyhow!("Expected database path"))?,
        )?;

        Ok(db)
    }
}
