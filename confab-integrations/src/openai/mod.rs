//! This module provides integration with `OpenAI`'s chat completion API and
//! endpoints compatible with it. It includes the `OpenAI` struct for managing
//! API clients and default options for the completion model.

use std::sync::Arc;

use async_openai::error::OpenAIError;
use confab_core::chat_completion::errors::LanguageModelError;
use confab_core::config::DEFAULT_MODEL;
use confab_core::settings::ResolvedSettings;
use confab_core::token_estimation::Estimatable;
use confab_core::EstimateTokens as _;
use derive_builder::Builder;
use secrecy::SecretString;

use crate::tiktoken::TikToken;

mod chat_completion;
mod config;

pub use config::ChatApiConfig;

/// The `OpenAI` struct encapsulates an `OpenAI` client and default options
/// for the completion model. It uses the `Builder` pattern for flexible and
/// customizable instantiation.
///
/// # Example
///
/// ```no_run
/// # use confab_integrations::openai::OpenAI;
///
/// // Create an OpenAI client with default options. The client will use the
/// // OPENAI_API_KEY environment variable.
/// let openai = OpenAI::builder()
///     .completion_model("gpt-4o")
///     .build().unwrap();
/// ```
#[derive(Debug, Builder, Clone)]
#[builder(setter(into, strip_option))]
pub struct OpenAI {
    /// The `OpenAI` client, wrapped in an `Arc` for thread-safe reference
    /// counting. Defaults to a new instance with [`ChatApiConfig::default`].
    #[builder(
        default = "Arc::new(async_openai::Client::with_config(ChatApiConfig::default()))",
        setter(custom)
    )]
    pub(crate) client: Arc<async_openai::Client<ChatApiConfig>>,

    /// Default options for the completion model.
    #[builder(default)]
    pub(crate) default_options: Options,

    #[builder(default = self.default_tiktoken())]
    pub(crate) tiktoken: TikToken,
}

/// The `Options` struct holds configuration options for the `OpenAI` client.
#[derive(Debug, Clone, Builder)]
#[builder(setter(into, strip_option))]
pub struct Options {
    /// The default model to use for completions, if specified.
    #[builder(default)]
    pub completion_model: Option<String>,

    /// Whether streamed responses carry the accumulated message on every
    /// chunk, or only the delta.
    #[builder(default = true)]
    pub stream_full: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            completion_model: None,
            stream_full: true,
        }
    }
}

impl Options {
    /// Creates a new `OptionsBuilder` for constructing `Options` instances.
    pub fn builder() -> OptionsBuilder {
        OptionsBuilder::default()
    }
}

impl OpenAI {
    /// Creates a new `OpenAIBuilder` for constructing `OpenAI` instances.
    pub fn builder() -> OpenAIBuilder {
        OpenAIBuilder::default()
    }

    /// Builds a client for the given API key and resolved settings.
    ///
    /// The settings decide the endpoint, how the key is presented, and the
    /// completion model; the tokenizer follows the model.
    pub fn from_settings(api_key: impl Into<SecretString>, settings: &ResolvedSettings) -> Self {
        let config = ChatApiConfig::from_settings(api_key, settings);

        Self {
            client: Arc::new(async_openai::Client::with_config(config)),
            default_options: Options {
                completion_model: Some(settings.model.clone()),
                stream_full: true,
            },
            tiktoken: TikToken::for_model(&settings.model),
        }
    }

    /// Estimates the number of tokens for implementors of the `Estimatable`
    /// trait, i.e. `String`, `ChatMessage` etc.
    ///
    /// # Errors
    ///
    /// Errors if tokenization fails in any way
    pub async fn estimate_tokens(&self, value: impl Estimatable) -> anyhow::Result<usize> {
        self.tiktoken.estimate(value).await
    }
}

impl OpenAIBuilder {
    /// Sets the `OpenAI` client for the `OpenAI` instance.
    pub fn client(&mut self, client: async_openai::Client<ChatApiConfig>) -> &mut Self {
        self.client = Some(Arc::new(client));
        self
    }

    /// Sets the default completion model for the `OpenAI` instance.
    pub fn completion_model(&mut self, model: impl Into<String>) -> &mut Self {
        if let Some(options) = self.default_options.as_mut() {
            options.completion_model = Some(model.into());
        } else {
            self.default_options = Some(Options {
                completion_model: Some(model.into()),
                ..Default::default()
            });
        }
        self
    }

    /// Stream only the delta instead of the accumulated response.
    ///
    /// Defaults to `true` (full snapshots).
    pub fn stream_full(&mut self, stream_full: bool) -> &mut Self {
        if let Some(options) = self.default_options.as_mut() {
            options.stream_full = stream_full;
        } else {
            self.default_options = Some(Options {
                stream_full,
                ..Default::default()
            });
        }
        self
    }

    fn default_tiktoken(&self) -> TikToken {
        let model = self
            .default_options
            .as_ref()
            .and_then(|o| o.completion_model.as_deref())
            .unwrap_or(DEFAULT_MODEL);

        TikToken::for_model(model)
    }
}

pub fn openai_error_to_language_model_error(e: OpenAIError) -> LanguageModelError {
    match e {
        OpenAIError::ApiError(api_error) => {
            // If the response is an ApiError, it could be a context length exceeded error
            if api_error.code == Some("context_length_exceeded".to_string()) {
                LanguageModelError::context_length_exceeded(OpenAIError::ApiError(api_error))
            } else {
                tracing::error!("OpenAI API Error: {:?}", api_error);
                LanguageModelError::permanent(OpenAIError::ApiError(api_error))
            }
        }
        OpenAIError::Reqwest(e) => {
            if let Some(status) = e.status() {
                // A 429 is transient unless the quota is exhausted; any other
                // 4xx is permanent, 5xx transient.
                if status.as_u16() == 429 && !e.to_string().contains("quota") {
                    LanguageModelError::transient(e)
                } else if status.is_client_error() {
                    tracing::error!("OpenAI API Client Error: {:?}", e);
                    LanguageModelError::permanent(e)
                } else if status.is_server_error() {
                    tracing::warn!("OpenAI API Server Error: {:?}", e);
                    LanguageModelError::transient(e)
                } else {
                    tracing::error!("Unexpected OpenAI Error: {:?}, error: {:?}", status, e);
                    LanguageModelError::permanent(e)
                }
            } else {
                // making the request failed for some other reason, probably recoverable
                tracing::error!("Unexpected OpenAI Reqwest Error: {:?}", e);
                LanguageModelError::transient(e)
            }
        }
        OpenAIError::JSONDeserialize(e) => {
            // OpenAI generated a non-json response, probably a temporary problem on their side
            tracing::error!("OpenAI response could not be deserialized: {:?}", e);
            LanguageModelError::transient(e)
        }
        OpenAIError::FileSaveError(msg) => {
            tracing::error!("OpenAI Failed to save file: {:?}", msg);
            LanguageModelError::permanent(OpenAIError::FileSaveError(msg))
        }
        OpenAIError::FileReadError(msg) => {
            tracing::error!("OpenAI Failed to read file: {:?}", msg);
            LanguageModelError::permanent(OpenAIError::FileReadError(msg))
        }
        OpenAIError::StreamError(msg) => {
            tracing::error!("OpenAI Stream failed: {:?}", msg);
            LanguageModelError::permanent(OpenAIError::StreamError(msg))
        }
        OpenAIError::InvalidArgument(msg) => {
            tracing::error!("OpenAI Invalid Argument: {:?}", msg);
            LanguageModelError::permanent(OpenAIError::InvalidArgument(msg))
        }
    }
}

#[cfg(test)]
mod test {
    use confab_core::settings::Settings;

    use super::*;

    #[test]
    fn test_builder_defaults() {
        let openai: OpenAI = OpenAI::builder()
            .completion_model("gpt-4o")
            .build()
            .unwrap();

        assert_eq!(
            openai.default_options.completion_model,
            Some("gpt-4o".to_string())
        );
        assert!(openai.default_options.stream_full);

        let openai: OpenAI = OpenAI::builder()
            .completion_model("gpt-4o")
            .stream_full(false)
            .build()
            .unwrap();
        assert!(!openai.default_options.stream_full);
    }

    #[test]
    fn test_from_settings_adopts_model() {
        let resolved = Settings {
            model: Some("gpt-4o".into()),
            ..Default::default()
        }
        .resolve();

        let openai = OpenAI::from_settings("sk-test", &resolved);

        assert_eq!(
            openai.default_options.completion_model,
            Some("gpt-4o".to_string())
        );
    }
}
