//! Third-party backed implementations of the confab core traits.
//!
//! - [`openai`]: chat completions against OpenAI and OpenAI-compatible
//!   endpoints via `async-openai`
//! - [`redb`]: embedded settings and transcript persistence
//! - [`tiktoken`]: token estimation with `tiktoken-rs`

pub mod openai;
pub mod redb;
pub mod tiktoken;
