use anyhow::{Context as _, Result};
use async_openai::types::{
    ChatCompletionRequestAssistantMessageArgs, ChatCompletionRequestSystemMessageArgs,
    ChatCompletionRequestUserMessageArgs, CreateChatCompletionRequest,
    CreateChatCompletionRequestArgs,
};
use async_trait::async_trait;
use futures_util::StreamExt as _;
use confab_core::chat_completion::{
    errors::LanguageModelError, ChatCompletion, ChatCompletionRequest, ChatCompletionResponse,
    ChatCompletionStream, ChatMessage, Usage,
};

use super::{openai_error_to_language_model_error, OpenAI};

#[async_trait]
impl ChatCompletion for OpenAI {
    #[tracing::instrument(skip_all)]
    async fn complete(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionResponse, LanguageModelError> {
        let openai_request = self.build_completion_request(request)?;

        tracing::debug!(
            request = serde_json::to_string_pretty(&openai_request).expect("infallible"),
            "Sending request to OpenAI"
        );

        let response = self
            .client
            .chat()
            .create(openai_request)
            .await
            .map_err(openai_error_to_language_model_error)?;

        tracing::debug!(
            response = serde_json::to_string_pretty(&response).expect("infallible"),
            "Received response from OpenAI"
        );

        ChatCompletionResponse::builder()
            .maybe_message(
                response
                    .choices
                    .first()
                    .and_then(|choice| choice.message.content.clone()),
            )
            .maybe_usage(response.usage.map(|usage| Usage {
                prompt_tokens: usage.prompt_tokens,
                completion_tokens: usage.completion_tokens,
                total_tokens: usage.total_tokens,
            }))
            .build()
            .map_err(LanguageModelError::permanent)
    }

    #[tracing::instrument(skip_all)]
    async fn complete_stream(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<ChatCompletionStream, LanguageModelError> {
        let openai_request = self.build_completion_request(request)?;

        tracing::debug!(
            request = serde_json::to_string_pretty(&openai_request).expect("infallible"),
            "Sending stream request to OpenAI"
        );

        let stream = self
            .client
            .chat()
            .create_stream(openai_request)
            .await
            .map_err(openai_error_to_language_model_error)?;

        let stream_full = self.default_options.stream_full;

        // Deltas arrive in send order; the accumulated state grows with each
        // chunk and every item yields a view of it.
        Ok(stream
            .scan(
                ChatCompletionResponse::default(),
                move |accumulated, chunk| {
                    let item = match chunk {
                        Ok(chunk) => {
                            accumulated.append_message_delta(
                                chunk
                                    .choices
                                    .first()
                                    .and_then(|choice| choice.delta.content.as_deref()),
                            );
                            if let Some(usage) = chunk.usage {
                                accumulated.append_usage_delta(
                                    usage.prompt_tokens,
                                    usage.completion_tokens,
                                    usage.total_tokens,
                                );
                            }
                            Ok(accumulated.snapshot(stream_full))
                        }
                        Err(e) => Err(openai_error_to_language_model_error(e)),
                    };

                    futures_util::future::ready(Some(item))
                },
            )
            .boxed())
    }
}

impl OpenAI {
    fn build_completion_request(
        &self,
        request: &ChatCompletionRequest,
    ) -> Result<CreateChatCompletionRequest, LanguageModelError> {
        let model = self
            .default_options
            .completion_model
            .as_ref()
            .context("Model not set")?;

        let messages = request
            .messages()
            .iter()
            .map(message_to_openai)
            .collect::<Result<Vec<_>>>()?;

        CreateChatCompletionRequestArgs::default()
            .model(model)
            .messages(messages)
            .build()
            .map_err(openai_error_to_language_model_error)
    }
}

fn message_to_openai(
    message: &ChatMessage,
) -> Result<async_openai::types::ChatCompletionRequestMessage> {
    let openai_message = match message {
        ChatMessage::User(msg) => ChatCompletionRequestUserMessageArgs::default()
            .content(msg.as_str())
            .build()?
            .into(),
        ChatMessage::System(msg) => ChatCompletionRequestSystemMessageArgs::default()
            .content(msg.as_str())
            .build()?
            .into(),
        ChatMessage::Assistant(msg) => ChatCompletionRequestAssistantMessageArgs::default()
            .content(msg.as_str())
            .build()?
            .into(),
    };

    Ok(openai_message)
}
