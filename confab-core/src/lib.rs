//! Domain types and traits for the confab chat completion backend.
//!
//! This crate carries the provider-agnostic pieces: role-tagged chat
//! messages, completion requests and (streaming) responses, user settings
//! with default fallback, the persisted chat/message records, and the store
//! and token-estimation traits the integration crates implement.

pub mod chat_completion;
pub mod config;
pub mod settings;
pub mod store_traits;
pub mod token_estimation;
mod transcript;

/// All traits are available from the root
pub use crate::chat_completion::ChatCompletion;
pub use crate::store_traits::*;
pub use crate::token_estimation::{CharEstimator, Estimatable, EstimateTokens};
pub use crate::transcript::{Chat, Message};
