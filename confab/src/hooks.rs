use anyhow::Result;
use std::{future::Future, pin::Pin};

use confab_core::chat_completion::ChatCompletionResponse;
use dyn_clone::DynClone;

/// Callback invoked for every chunk of a streamed completion.
///
/// Receives the accumulated response (or only the delta when the provider
/// streams deltas only).
pub trait OnStreamFn:
    for<'a> Fn(&'a ChatCompletionResponse) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>
    + Send
    + Sync
    + DynClone
{
}

dyn_clone::clone_trait_object!(OnStreamFn);

impl<F> OnStreamFn for F where
    F: for<'a> Fn(
            &'a ChatCompletionResponse,
        ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + 'a>>
        + Send
        + Sync
        + DynClone
{
}
