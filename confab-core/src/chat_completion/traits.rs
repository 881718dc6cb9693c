use std::pin::Pin;

use async_trait::async_trait;
use dyn_clone::DynClone;
use futures_util::Stream;

use super::{
    chat_completion_request::ChatCompletionRequest,
    chat_completion_response::ChatCompletionResponse, errors::LanguageModelError,
};

/// A stream of accumulating completion responses. Each item carries the latest
/// delta and, unless the provider streams deltas only, the snapshot so far.
pub type ChatCompletionStream =
    Pin<Box<dyn Stream<Item = Result<ChatCompletionResponse, LanguageModelError>> + Send>>;

#[async_trait]
pub trait ChatCompletion: Send + Sync + DynClone {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LanguageModelError>;

    async fn complete_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionStream, LanguageModelError>;
}

#[async_trait]
impl ChatCompletion for Box<dyn ChatCompletion> {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LanguageModelError> {
        (**self).complete(request).await
    }

    async fn complete_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionStream, LanguageModelError> {
        (**self).complete_stream(request).await
    }
}

#[async_trait]
impl ChatCompletion for &dyn ChatCompletion {
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LanguageModelError> {
        (**self).complete(request).await
    }

    async fn complete_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionStream, LanguageModelError> {
        (**self).complete_stream(request).await
    }
}

impl<LLM> From<&LLM> for Box<dyn ChatCompletion>
where
    LLM: ChatCompletion + Clone + 'static,
{
    fn from(llm: &LLM) -> Self {
        Box::new(llm.clone()) as Box<dyn ChatCompletion>
    }
}

dyn_clone::clone_trait_object!(ChatCompletion);
