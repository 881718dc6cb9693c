use anyhow::Result;
use async_trait::async_trait;
use confab_core::settings::Settings;
use confab_core::{Chat, Message, SettingsStore, TranscriptStore};
use redb::{ReadableTable, TableDefinition};
use serde::de::DeserializeOwned;
use serde::Serialize;

use super::{Redb, CHATS_TABLE, MESSAGES_TABLE, SETTINGS_TABLE};

impl Redb {
    fn read_json<T: DeserializeOwned>(
        &self,
        table: TableDefinition<String, String>,
        key: &str,
    ) -> Result<Option<T>> {
        let read_txn = self.database.begin_read()?;

        let table = match read_txn.open_table(table) {
            Ok(table) => table,
            // An untouched database has no tables yet; that simply reads as
            // an absent record.
            Err(redb::TableError::TableDoesNotExist { .. }) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let Some(guard) = table.get(key.to_string())? else {
            return Ok(None);
        };

        Ok(Some(serde_json::from_str(&guard.value())?))
    }

    fn write_json<T: Serialize>(
        &self,
        table: TableDefinition<String, String>,
        key: &str,
        value: &T,
    ) -> Result<()> {
        let write_txn = self.database.begin_write()?;

        {
            let mut table = write_txn.open_table(table)?;
            table.insert(key.to_string(), serde_json::to_string(value)?)?;
        }
        write_txn.commit()?;

        Ok(())
    }
}

#[async_trait]
impl SettingsStore for Redb {
    #[tracing::instrument(skip_all)]
    async fn get_settings(&self, key: &str) -> Result<Option<Settings>> {
        self.read_json(SETTINGS_TABLE, key)
    }

    #[tracing::instrument(skip_all)]
    async fn set_settings(&self, key: &str, settings: &Settings) -> Result<()> {
        self.write_json(SETTINGS_TABLE, key, settings)
    }
}

#[async_trait]
impl TranscriptStore for Redb {
    #[tracing::instrument(skip_all)]
    async fn get_chat(&self, id: &str) -> Result<Option<Chat>> {
        self.read_json(CHATS_TABLE, id)
    }

    #[tracing::instrument(skip_all)]
    async fn put_chat(&self, chat: &Chat) -> Result<()> {
        self.write_json(CHATS_TABLE, &chat.id, chat)
    }

    #[tracing::instrument(skip_all)]
    async fn get_message(&self, id: &str) -> Result<Option<Message>> {
        self.read_json(MESSAGES_TABLE, id)
    }

    #[tracing::instrument(skip_all)]
    async fn put_message(&self, message: &Message) -> Result<()> {
        self.write_json(MESSAGES_TABLE, &message.id, message)
    }

    #[tracing::instrument(skip_all)]
    async fn set_message_content(&self, id: &str, content: &str) -> Result<()> {
        self.write_json(MESSAGES_TABLE, id, &Message::new(id, content))
    }

    /// Read-modify-write inside a single write transaction, so concurrent
    /// completions cannot lose increments.
    #[tracing::instrument(skip_all)]
    async fn add_chat_tokens(&self, id: &str, tokens: usize) -> Result<()> {
        let write_txn = self.database.begin_write()?;

        {
            let mut table = write_txn.open_table(CHATS_TABLE)?;

            let mut chat = {
                match table.get(id.to_string())? {
                    Some(guard) => serde_json::from_str(&guard.value())?,
                    None => Chat::new(id),
                }
            };

            chat.total_tokens += tokens;
            table.insert(id.to_string(), serde_json::to_string(&chat)?)?;
        }
        write_txn.commit()?;

        Ok(())
    }
}
