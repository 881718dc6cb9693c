//! Use tiktoken-rs to estimate token count on chat content.
//!
//! Intended to be used for openai models.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use confab_core::token_estimation::{Estimatable, EstimateTokens};
use tiktoken_rs::{get_bpe_from_model, get_bpe_from_tokenizer, tokenizer::Tokenizer, CoreBPE};

/// A tiktoken based tokenizer for openai models. Can also be used for other
/// models.
///
/// Implements `EstimateTokens` for chat messages, lists of chat messages, and
/// regular strings. Estimates are estimates; not exact counts.
#[derive(Clone)]
pub struct TikToken {
    /// The tiktoken model to use
    bpe: Arc<CoreBPE>,
}

impl std::fmt::Debug for TikToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TikToken").finish()
    }
}

impl TikToken {
    /// Build a `TikToken` from an openai model name
    ///
    /// # Errors
    ///
    /// Errors if the tokenizer cannot be found from the model or it cannot be
    /// build
    pub fn try_from_model(model: impl AsRef<str>) -> Result<Self> {
        let bpe = get_bpe_from_model(model.as_ref())?;
        Ok(Self { bpe: Arc::new(bpe) })
    }

    /// Build a `TikToken` from a `tiktoken_rs::tiktoken::Tokenizer`
    ///
    /// # Errors
    ///
    /// Errors if the tokenizer cannot be build
    pub fn try_from_tokenizer(tokenizer: Tokenizer) -> Result<Self> {
        let bpe = get_bpe_from_tokenizer(tokenizer)?;
        Ok(Self { bpe: Arc::new(bpe) })
    }

    /// Build a `TikToken` for a model name, falling back to the `cl100k_base`
    /// tokenizer for names tiktoken does not know (custom deployments).
    pub fn for_model(model: impl AsRef<str>) -> Self {
        Self::try_from_model(model.as_ref()).unwrap_or_else(|_| {
            Self::try_from_tokenizer(Tokenizer::Cl100kBase)
                .expect("cl100k_base is built in; infallible")
        })
    }
}

#[async_trait]
impl EstimateTokens for TikToken {
    async fn estimate(&self, value: impl Estimatable) -> Result<usize> {
        Ok(value
            .for_estimate()?
            .iter()
            .map(|part| self.bpe.encode_with_special_tokens(part).len())
            .sum::<usize>()
            + value.additional_tokens())
    }
}

#[cfg(test)]
mod tests {
    use confab_core::chat_completion::ChatMessage;

    use super::*;

    #[tokio::test]
    async fn test_estimate_tokens() {
        let tokenizer = TikToken::try_from_model("gpt-4-0314").unwrap();
        let tokens = tokenizer.estimate("hello {{world}}").await.unwrap();
        assert_eq!(tokens, 4);
    }

    #[tokio::test]
    async fn test_estimate_tokens_from_tokenizer() {
        let tokenizer = TikToken::try_from_tokenizer(Tokenizer::O200kBase).unwrap();
        let tokens = tokenizer.estimate("hello {{world}}").await.unwrap();
        assert_eq!(tokens, 4);
    }

    #[tokio::test]
    async fn test_estimate_chat_messages() {
        let messages = vec![
            ChatMessage::new_user("hello"),
            ChatMessage::new_system("world"),
        ];

        let tokenizer = TikToken::try_from_model("gpt-4-0314").unwrap();

        // one token per word, 4 extra per message, 3 for reply priming
        assert_eq!(tokenizer.estimate(messages.as_slice()).await.unwrap(), 13);
    }

    #[tokio::test]
    async fn test_unknown_model_falls_back_to_cl100k() {
        let tokenizer = TikToken::for_model("my-custom-deployment");
        assert_eq!(tokenizer.estimate("hello").await.unwrap(), 1);
    }
}
