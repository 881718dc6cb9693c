//! This module enables the implementation of chat completion on LLM providers
//!
//! The main trait to implement is `ChatCompletion`, which takes a
//! `ChatCompletionRequest` and returns a `ChatCompletionResponse`, either as a
//! single value or as a stream of accumulating snapshots.
mod chat_completion_request;
mod chat_completion_response;
mod chat_message;
pub mod errors;

// Re-exported in the root per convention
pub mod traits;

pub use chat_completion_request::*;
pub use chat_completion_response::*;
pub use chat_message::*;
pub use traits::*;
