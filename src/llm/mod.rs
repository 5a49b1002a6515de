// Chat model abstraction over the Ollama HTTP API
//
// Every workflow talks to the model through the `ChatModel` trait so tests
// and offline demos can substitute `MockChatModel` for a live server.

use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use tokio::sync::mpsc::Receiver;

pub mod mock;
pub mod ollama;
pub mod retry;
pub mod types;

pub use mock::{MockChatModel, MockEmbedder};
pub use ollama::OllamaClient;
pub use types::{ChatMessage, ChatRequest, ChatResponse, ModelOptions, StreamChunk};

/// Trait for chat-capable language models
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send a request and wait for the complete response
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    /// Send a request and stream the response
    ///
    /// Returns a channel of `StreamChunk` items (text deltas followed by one
    /// `Complete`). The channel closes when the stream finishes.
    async fn chat_stream(&self, request: &ChatRequest)
        -> Result<Receiver<Result<StreamChunk>>>;

    /// Backend name (e.g. "ollama", "mock")
    fn name(&self) -> &str;

    /// Model used when a request leaves `model` empty
    fn default_model(&self) -> &str;
}

/// Trait for text embedding backends
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed each text into a vector; output order matches input order
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;
}

/// Issue a JSON-constrained request and deserialize the reply.
///
/// The prompt must instruct the model to answer with JSON matching `T`;
/// `format: "json"` constrains decoding, and markdown code fences are
/// stripped in case the model wraps its output anyway.
pub async fn chat_structured<T: DeserializeOwned>(
    model: &dyn ChatModel,
    request: ChatRequest,
) -> Result<T> {
    let response = model.chat(&request.with_json_format()).await?;

    let text = response.text().trim();
    if text.is_empty() {
        anyhow::bail!("Model returned empty content for a structured request");
    }

    let text = strip_json_fences(text);
    serde_json::from_str(text)
        .with_context(|| format!("Failed to parse structured model output: {}", text))
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    struct Verdict {
        approved: bool,
    }

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_without_tag() {
        let input = "```\n{\"key\": \"value\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[test]
    fn test_strip_json_fences_no_fences() {
        let input = "{\"key\": \"value\"}";
        assert_eq!(strip_json_fences(input), "{\"key\": \"value\"}");
    }

    #[tokio::test]
    async fn test_chat_structured_parses_reply() {
        let model = MockChatModel::with_reply(r#"{"approved": true}"#);
        let verdict: Verdict =
            chat_structured(&model, ChatRequest::from_prompts("judge", "answer"))
                .await
                .unwrap();
        assert!(verdict.approved);
    }

    #[tokio::test]
    async fn test_chat_structured_strips_fences() {
        let model = MockChatModel::with_reply("```json\n{\"approved\": false}\n```");
        let verdict: Verdict =
            chat_structured(&model, ChatRequest::from_prompts("judge", "answer"))
                .await
                .unwrap();
        assert!(!verdict.approved);
    }

    #[tokio::test]
    async fn test_chat_structured_sets_json_format() {
        let model = MockChatModel::with_reply(r#"{"approved": true}"#);
        let _: Verdict = chat_structured(&model, ChatRequest::from_prompts("j", "a"))
            .await
            .unwrap();
        let sent = model.requests();
        assert_eq!(sent[0].format, Some(serde_json::Value::String("json".into())));
    }

    #[tokio::test]
    async fn test_chat_structured_rejects_garbage() {
        let model = MockChatModel::with_reply("not json at all");
        let result: Result<Verdict> =
            chat_structured(&model, ChatRequest::from_prompts("j", "a")).await;
        assert!(result.is_err());
    }
}
