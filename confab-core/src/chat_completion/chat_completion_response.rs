use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A generic response from chat completions
///
/// When streaming, the delta is available. Every response will have the
/// accumulated message if present.
#[derive(Clone, Builder, Debug, Serialize, Deserialize, PartialEq)]
#[builder(setter(strip_option, into))]
pub struct ChatCompletionResponse {
    /// An identifier for the response
    ///
    /// Useful when streaming to make sure chunks can be mapped to the right response
    #[builder(private, default = Uuid::new_v4())]
    pub id: Uuid,

    #[builder(default)]
    pub message: Option<String>,

    #[builder(default)]
    pub usage: Option<Usage>,

    /// Streaming response
    #[builder(default)]
    pub delta: Option<ChatCompletionResponseDelta>,
}

impl Default for ChatCompletionResponse {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4(),
            message: None,
            usage: None,
            delta: None,
        }
    }
}

#[derive(Clone, Default, Builder, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Usage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

impl Usage {
    pub fn builder() -> UsageBuilder {
        UsageBuilder::default()
    }
}

#[derive(Clone, Builder, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChatCompletionResponseDelta {
    #[builder(default)]
    pub message_chunk: Option<String>,
}

impl ChatCompletionResponse {
    pub fn builder() -> ChatCompletionResponseBuilder {
        ChatCompletionResponseBuilder::default()
    }

    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Adds a streaming chunk to the message and also the delta
    pub fn append_message_delta(&mut self, message_delta: Option<&str>) -> &mut Self {
        let Some(message_delta) = message_delta else {
            return self;
        };

        if let Some(delta) = &mut self.delta {
            delta.message_chunk = Some(message_delta.to_string());
        } else {
            self.delta = Some(ChatCompletionResponseDelta {
                message_chunk: Some(message_delta.to_string()),
            });
        }

        self.message
            .as_mut()
            .map(|m| {
                m.push_str(message_delta);
            })
            .unwrap_or_else(|| {
                self.message = Some(message_delta.to_string());
            });
        self
    }

    pub fn append_usage_delta(
        &mut self,
        prompt_tokens: u32,
        completion_tokens: u32,
        total_tokens: u32,
    ) -> &mut Self {
        debug_assert!(prompt_tokens + completion_tokens == total_tokens);

        if let Some(usage) = &mut self.usage {
            usage.prompt_tokens += prompt_tokens;
            usage.completion_tokens += completion_tokens;
            usage.total_tokens += total_tokens;
        } else {
            self.usage = Some(Usage {
                prompt_tokens,
                completion_tokens,
                total_tokens,
            });
        }
        self
    }

    /// View of the accumulated state for streaming consumers. With
    /// `stream_full` the accumulated message and usage are included, otherwise
    /// only the latest delta.
    pub fn snapshot(&self, stream_full: bool) -> ChatCompletionResponse {
        if stream_full {
            self.clone()
        } else {
            ChatCompletionResponse {
                message: None,
                usage: None,
                ..self.clone()
            }
        }
    }
}

impl ChatCompletionResponseBuilder {
    pub fn maybe_message<T: Into<Option<String>>>(&mut self, message: T) -> &mut Self {
        self.message = Some(message.into());
        self
    }

    pub fn maybe_usage<T: Into<Option<Usage>>>(&mut self, usage: T) -> &mut Self {
        self.usage = Some(usage.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_append_message_delta_accumulates() {
        let mut response = ChatCompletionResponse::default();

        response.append_message_delta(Some("Hel"));
        response.append_message_delta(Some("lo"));
        response.append_message_delta(None);

        assert_eq!(response.message(), Some("Hello"));
        assert_eq!(
            response.delta.as_ref().and_then(|d| d.message_chunk.as_deref()),
            Some("lo")
        );
    }

    #[test]
    fn test_append_usage_delta_sums() {
        let mut response = ChatCompletionResponse::default();

        response.append_usage_delta(1, 2, 3);
        response.append_usage_delta(4, 5, 9);

        assert_eq!(
            response.usage,
            Some(Usage {
                prompt_tokens: 5,
                completion_tokens: 7,
                total_tokens: 12
            })
        );
    }

    #[test]
    fn test_snapshot_keeps_id_and_delta() {
        let mut response = ChatCompletionResponse::default();
        response.append_message_delta(Some("Hello"));
        response.append_usage_delta(1, 1, 2);

        let full = response.snapshot(true);
        assert_eq!(full, response);

        let delta_only = response.snapshot(false);
        assert_eq!(delta_only.id, response.id);
        assert_eq!(delta_only.message, None);
        assert_eq!(delta_only.usage, None);
        assert_eq!(delta_only.delta, response.delta);
    }
}
