use std::sync::Arc;

use anyhow::Result;
use derive_builder::Builder;
use futures_util::StreamExt as _;
use secrecy::SecretString;

use confab_core::chat_completion::{
    ChatCompletion as _, ChatCompletionRequest, ChatCompletionResponse, ChatMessage,
};
use confab_core::settings::GENERAL_SETTINGS;
use confab_core::{SettingsStore, TranscriptStore};
use confab_integrations::openai::OpenAI;

use crate::hooks::OnStreamFn;

/// Appended to in-progress message content so readers can tell a streaming
/// snapshot from a finished message. Removed on completion.
pub const STREAM_CURSOR: char = '█';

/// A `Session` ties the completion provider to the client-side store.
///
/// Settings are re-read from the store on every request, so configuration
/// changes apply without rebuilding the session; only the API key and the
/// store handles live for the session's lifetime.
///
/// # Example
///
/// ```no_run
/// # use confab::Session;
/// # use confab_integrations::redb::Redb;
/// # fn main() -> anyhow::Result<()> {
/// let store = Redb::builder().database_path("confab.redb").build()?;
///
/// let session = Session::builder()
///     .api_key("sk-my-key")
///     .settings(store.clone())
///     .transcripts(store)
///     .build()?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Builder)]
#[builder(setter(into, strip_option), build_fn(error = "anyhow::Error"))]
pub struct Session {
    api_key: SecretString,

    #[builder(setter(custom))]
    settings: Arc<dyn SettingsStore>,

    #[builder(setter(custom))]
    transcripts: Arc<dyn TranscriptStore>,

    /// Invoked per streamed chunk, after the snapshot has been persisted.
    #[builder(default, setter(custom))]
    on_stream: Option<Box<dyn OnStreamFn>>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("api_key", &self.api_key)
            .finish()
    }
}

impl SessionBuilder {
    pub fn settings(&mut self, store: impl SettingsStore + 'static) -> &mut Self {
        self.settings = Some(Arc::new(store));
        self
    }

    pub fn transcripts(&mut self, store: impl TranscriptStore + 'static) -> &mut Self {
        self.transcripts = Some(Arc::new(store));
        self
    }

    pub fn on_stream<F: OnStreamFn + 'static>(&mut self, hook: F) -> &mut Self {
        self.on_stream = Some(Some(Box::new(hook)));
        self
    }
}

impl Session {
    pub fn builder() -> SessionBuilder {
        SessionBuilder::default()
    }

    /// Builds a provider from the stored settings, falling back to defaults
    /// for anything unset.
    async fn provider(&self) -> Result<OpenAI> {
        let settings = self
            .settings
            .get_settings(GENERAL_SETTINGS)
            .await?
            .unwrap_or_default()
            .resolve();

        tracing::debug!(model = %settings.model, api_type = %settings.api_type, "Resolved settings");

        Ok(OpenAI::from_settings(self.api_key.clone(), &settings))
    }

    /// Requests a completion and streams it into the message record.
    ///
    /// While chunks arrive, the message content is overwritten with the
    /// snapshot so far plus a trailing [`STREAM_CURSOR`]. Once the stream
    /// completes, the final content is written without the cursor and the
    /// estimated token count of the final text is added to the chat's
    /// running total.
    ///
    /// Returns the final accumulated response.
    #[tracing::instrument(skip(self, messages))]
    pub async fn stream_completion(
        &self,
        chat_id: &str,
        message_id: &str,
        messages: &[ChatMessage],
    ) -> Result<ChatCompletionResponse> {
        let llm = self.provider().await?;
        let request = ChatCompletionRequest::builder()
            .messages(messages.to_vec())
            .build()?;

        let mut stream = llm.complete_stream(&request).await?;
        let mut response = ChatCompletionResponse::default();

        while let Some(chunk) = stream.next().await {
            response = chunk?;

            let snapshot = response.message().unwrap_or_default();
            self.transcripts
                .set_message_content(message_id, &format!("{snapshot}{STREAM_CURSOR}"))
                .await?;

            if let Some(hook) = &self.on_stream {
                hook(&response).await?;
            }
        }

        let content = response.message().unwrap_or_default().to_string();
        self.transcripts
            .set_message_content(message_id, &content)
            .await?;

        let tokens = llm.estimate_tokens(content.as_str()).await?;
        self.transcripts.add_chat_tokens(chat_id, tokens).await?;

        Ok(response)
    }

    /// Requests a single synchronous completion. The store is not touched;
    /// the response is returned to the caller.
    #[tracing::instrument(skip_all)]
    pub async fn complete(&self, messages: &[ChatMessage]) -> Result<ChatCompletionResponse> {
        let llm = self.provider().await?;
        let request = ChatCompletionRequest::builder()
            .messages(messages.to_vec())
            .build()?;

        Ok(llm.complete(&request).await?)
    }

    /// Sends a trivial one-word completion as a connectivity and credential
    /// check. Success or failure of the underlying call is the only signal.
    #[tracing::instrument(skip_all)]
    pub async fn verify_key(&self) -> Result<ChatCompletionResponse> {
        self.complete(&[ChatMessage::new_user("hello")]).await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use anyhow::Result;
    use async_trait::async_trait;
    use confab_core::settings::Settings;
    use confab_core::{Chat, Message};
    use confab_integrations::redb::Redb;
    use indoc::indoc;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use temp_dir::TempDir;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    use super::*;

    fn stream_body() -> String {
        indoc! {r#"
            data: {"id":"chatcmpl-abc123","object":"chat.completion.chunk","created":1700000000,"model":"gpt-4o","choices":[{"index":0,"delta":{"role":"assistant","content":"Hel"},"finish_reason":null}]}

            data: {"id":"chatcmpl-abc123","object":"chat.completion.chunk","created":1700000000,"model":"gpt-4o","choices":[{"index":0,"delta":{"content":"lo"},"finish_reason":null}]}

            data: {"id":"chatcmpl-abc123","object":"chat.completion.chunk","created":1700000000,"model":"gpt-4o","choices":[{"index":0,"delta":{},"finish_reason":"stop"}]}

            data: [DONE]

        "#}
        .to_string()
    }

    fn completion_body(content: &str) -> serde_json::Value {
        json!({
            "id": "chatcmpl-abc123",
            "object": "chat.completion",
            "created": 1_700_000_000,
            "model": "gpt-3.5-turbo",
            "choices": [{
                "index": 0,
                "message": { "role": "assistant", "content": content },
                "finish_reason": "stop",
                "logprobs": null
            }]
        })
    }

    async fn store_pointing_at(server: &MockServer, tempdir: &TempDir) -> Redb {
        let redb = Redb::builder()
            .database_path(tempdir.child("confab-test"))
            .build()
            .unwrap();

        redb.set_settings(
            GENERAL_SETTINGS,
            &Settings {
                api_base: Some(server.uri()),
                ..Default::default()
            },
        )
        .await
        .unwrap();

        redb
    }

    /// Records every content write so the in-progress cursor is observable.
    #[derive(Clone, Default)]
    struct RecordingStore {
        contents: Arc<Mutex<Vec<String>>>,
        tokens: Arc<Mutex<Vec<usize>>>,
    }

    #[async_trait]
    impl TranscriptStore for RecordingStore {
        async fn get_chat(&self, _id: &str) -> Result<Option<Chat>> {
            Ok(None)
        }

        async fn put_chat(&self, _chat: &Chat) -> Result<()> {
            Ok(())
        }

        async fn get_message(&self, _id: &str) -> Result<Option<Message>> {
            Ok(None)
        }

        async fn put_message(&self, _message: &Message) -> Result<()> {
            Ok(())
        }

        async fn set_message_content(&self, _id: &str, content: &str) -> Result<()> {
            self.contents.lock().unwrap().push(content.to_string());
            Ok(())
        }

        async fn add_chat_tokens(&self, _id: &str, tokens: usize) -> Result<()> {
            self.tokens.lock().unwrap().push(tokens);
            Ok(())
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_stream_completion_persists_final_content_and_tokens() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(stream_body(), "text/event-stream"),
            )
            .mount(&mock_server)
            .await;

        let tempdir = TempDir::new().unwrap();
        let redb = store_pointing_at(&mock_server, &tempdir).await;

        let session = Session::builder()
            .api_key("sk-test")
            .settings(redb.clone())
            .transcripts(redb.clone())
            .build()
            .unwrap();

        let response = session
            .stream_completion("chat-1", "msg-1", &[ChatMessage::new_user("hello")])
            .await
            .unwrap();

        assert_eq!(response.message(), Some("Hello"));

        let message = redb.get_message("msg-1").await.unwrap().unwrap();
        assert_eq!(message.content, "Hello");
        assert!(!message.content.contains(STREAM_CURSOR));

        // "Hello" is a single token; a second completion accumulates
        let chat = redb.get_chat("chat-1").await.unwrap().unwrap();
        assert_eq!(chat.total_tokens, 1);

        session
            .stream_completion("chat-1", "msg-2", &[ChatMessage::new_user("hello")])
            .await
            .unwrap();
        let chat = redb.get_chat("chat-1").await.unwrap().unwrap();
        assert_eq!(chat.total_tokens, 2);
    }

    #[test_log::test(tokio::test)]
    async fn test_stream_completion_marks_snapshots_with_cursor() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(stream_body(), "text/event-stream"),
            )
            .mount(&mock_server)
            .await;

        let tempdir = TempDir::new().unwrap();
        let redb = store_pointing_at(&mock_server, &tempdir).await;
        let recorder = RecordingStore::default();

        let session = Session::builder()
            .api_key("sk-test")
            .settings(redb)
            .transcripts(recorder.clone())
            .build()
            .unwrap();

        session
            .stream_completion("chat-1", "msg-1", &[ChatMessage::new_user("hello")])
            .await
            .unwrap();

        let contents = recorder.contents.lock().unwrap().clone();
        assert_eq!(contents, vec!["Hel█", "Hello█", "Hello█", "Hello"]);

        let tokens = recorder.tokens.lock().unwrap().clone();
        assert_eq!(tokens, vec![1]);
    }

    #[test_log::test(tokio::test)]
    async fn test_stream_completion_fires_hook_per_chunk() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(
                ResponseTemplate::new(200).set_body_raw(stream_body(), "text/event-stream"),
            )
            .mount(&mock_server)
            .await;

        let tempdir = TempDir::new().unwrap();
        let redb = store_pointing_at(&mock_server, &tempdir).await;

        let seen = Arc::new(Mutex::new(Vec::new()));
        let seen_in_hook = seen.clone();

        let session = Session::builder()
            .api_key("sk-test")
            .settings(redb.clone())
            .transcripts(redb)
            .on_stream(move |response: &ChatCompletionResponse| {
                let seen = seen_in_hook.clone();
                let message = response.message().map(str::to_string);
                Box::pin(async move {
                    seen.lock().unwrap().push(message);
                    Ok(())
                })
            })
            .build()
            .unwrap();

        session
            .stream_completion("chat-1", "msg-1", &[ChatMessage::new_user("hello")])
            .await
            .unwrap();

        let seen = seen.lock().unwrap().clone();
        assert_eq!(
            seen,
            vec![
                Some("Hel".to_string()),
                Some("Hello".to_string()),
                Some("Hello".to_string())
            ]
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_verify_key_sends_hello_probe() {
        let mock_server = MockServer::start().await;

        // the default model is used when no settings override it
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "model": "gpt-3.5-turbo",
                "messages": [{"role": "user", "content": "hello"}]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("Hi!")))
            .expect(1)
            .mount(&mock_server)
            .await;

        let tempdir = TempDir::new().unwrap();
        let redb = store_pointing_at(&mock_server, &tempdir).await;
        let recorder = RecordingStore::default();

        let session = Session::builder()
            .api_key("sk-test")
            .settings(redb)
            .transcripts(recorder.clone())
            .build()
            .unwrap();

        let response = session.verify_key().await.unwrap();
        assert_eq!(response.message(), Some("Hi!"));

        // non-streaming paths never touch the transcript store
        assert!(recorder.contents.lock().unwrap().is_empty());
        assert!(recorder.tokens.lock().unwrap().is_empty());
    }

    #[test_log::test(tokio::test)]
    async fn test_verify_key_fails_on_error_response() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(401).set_body_json(json!({
                "error": {
                    "message": "Incorrect API key provided",
                    "type": "invalid_request_error",
                    "param": null,
                    "code": "invalid_api_key"
                }
            })))
            .mount(&mock_server)
            .await;

        let tempdir = TempDir::new().unwrap();
        let redb = store_pointing_at(&mock_server, &tempdir).await;

        let session = Session::builder()
            .api_key("sk-wrong")
            .settings(redb.clone())
            .transcripts(redb)
            .build()
            .unwrap();

        assert!(session.verify_key().await.is_err());
    }
}
