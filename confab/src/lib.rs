//! # Confab
//!
//! Confab is a streaming chat completion backend for chat applications. It
//! resolves user-configurable connection settings, issues streaming or
//! non-streaming completion requests against OpenAI-compatible endpoints, and
//! persists incremental output and token-usage counters into an embedded
//! client-side store.
//!
//! ## Features
//!
//! - Streaming completions with accumulated snapshots and per-chunk hooks
//! - Settings with per-field fallback to defaults, re-read on every request
//! - Custom (Azure-style) deployments: `api-key` header and `api-version`
//!   query parameter
//! - Embedded persistence of chats and messages with `redb`
//! - Token accounting with `tiktoken-rs`
//! - `tracing` supported for logging, see the `tracing` crate for more
//!   information
//!
//! ## Example
//!
//! ```no_run
//! # use confab::{ChatMessage, Session};
//! # use confab::integrations::redb::Redb;
//! # #[tokio::main]
//! # async fn main() -> anyhow::Result<()> {
//! let store = Redb::builder().database_path("confab.redb").build()?;
//!
//! let session = Session::builder()
//!     .api_key("sk-my-key")
//!     .settings(store.clone())
//!     .transcripts(store)
//!     .build()?;
//!
//! session
//!     .stream_completion(
//!         "chat-1",
//!         "msg-1",
//!         &[ChatMessage::new_user("Why is the rust programming language so good?")],
//!     )
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod hooks;
mod session;

pub use session::{Session, SessionBuilder, STREAM_CURSOR};

pub use confab_core::chat_completion::{
    self, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
};
pub use confab_core::settings::{self, Settings};
pub use confab_core::{Chat, ChatCompletion, Message, SettingsStore, TranscriptStore};

pub mod integrations {
    pub use confab_integrations::{openai, redb, tiktoken};
}
