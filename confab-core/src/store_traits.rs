//! Traits for the client-side store backing the chat application.
//!
//! Implementations live in the integration crates; an embedded key-value
//! store is enough. All operations are keyed by record id and mutate single
//! records, there is no query surface.

use anyhow::Result;
use async_trait::async_trait;
use dyn_clone::DynClone;

use crate::settings::Settings;
use crate::transcript::{Chat, Message};

#[async_trait]
pub trait SettingsStore: Send + Sync + DynClone {
    async fn get_settings(&self, key: &str) -> Result<Option<Settings>>;

    async fn set_settings(&self, key: &str, settings: &Settings) -> Result<()>;
}

dyn_clone::clone_trait_object!(SettingsStore);

#[async_trait]
pub trait TranscriptStore: Send + Sync + DynClone {
    async fn get_chat(&self, id: &str) -> Result<Option<Chat>>;

    async fn put_chat(&self, chat: &Chat) -> Result<()>;

    async fn get_message(&self, id: &str) -> Result<Option<Message>>;

    async fn put_message(&self, message: &Message) -> Result<()>;

    /// Overwrites the content of a message in place, creating the record if
    /// it does not exist yet.
    async fn set_message_content(&self, id: &str, content: &str) -> Result<()>;

    /// Adds to a chat's running token total. A missing chat row counts as a
    /// total of zero.
    async fn add_chat_tokens(&self, id: &str, tokens: usize) -> Result<()>;
}

dyn_clone::clone_trait_object!(TranscriptStore);
