use derive_builder::Builder;

use super::chat_message::ChatMessage;

/// A chat completion request represents a series of chat messages that can be
/// sent to any LLM provider.
#[derive(Builder, Clone, PartialEq, Eq, Debug)]
#[builder(setter(into, strip_option))]
pub struct ChatCompletionRequest {
    messages: Vec<ChatMessage>,
}

impl ChatCompletionRequest {
    pub fn builder() -> ChatCompletionRequestBuilder {
        ChatCompletionRequestBuilder::default()
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_keep_order() {
        let request = ChatCompletionRequest::builder()
            .messages(vec![
                ChatMessage::new_system("System message"),
                ChatMessage::new_user("Hello"),
            ])
            .build()
            .unwrap();

        assert_eq!(request.messages().len(), 2);
        assert!(request.messages()[0].is_system());
        assert!(request.messages()[1].is_user());
    }
}
