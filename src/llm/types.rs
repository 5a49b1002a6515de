// Ollama API request/response types

use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Sampling options forwarded to the model verbatim.
///
/// Only the fields the workflows actually use are modeled; Ollama ignores
/// absent keys and applies its own defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ModelOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
}

/// Request body for `POST /api/chat`
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    /// Model name (empty = client default)
    pub model: String,

    /// Conversation messages, system prompt included as the first message
    pub messages: Vec<ChatMessage>,

    /// Constrained decoding: `"json"` or a JSON schema object
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub options: Option<ModelOptions>,

    #[serde(skip_serializing_if = "is_false")]
    pub stream: bool,
}

fn is_false(b: &bool) -> bool {
    !*b
}

impl ChatRequest {
    /// Create a new request from messages
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            model: String::new(), // resolved by the client
            messages,
            format: None,
            options: None,
            stream: false,
        }
    }

    /// Single system + user turn, the shape every workflow step uses
    pub fn from_prompts(system: impl Into<String>, user: impl Into<String>) -> Self {
        Self::new(vec![ChatMessage::system(system), ChatMessage::user(user)])
    }

    /// Set the model name
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Constrain the reply to valid JSON
    pub fn with_json_format(mut self) -> Self {
        self.format = Some(Value::String("json".to_string()));
        self
    }

    /// Set temperature
    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.options
            .get_or_insert_with(ModelOptions::default)
            .temperature = Some(temperature);
        self
    }

    /// Enable streaming
    pub fn with_stream(mut self, stream: bool) -> Self {
        self.stream = stream;
        self
    }
}

/// Response body for a non-streaming `POST /api/chat`
///
/// Streaming responses reuse the same shape, one NDJSON line per chunk with
/// `done: false` until the terminal line.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub model: String,
    pub message: ChatMessage,
    pub done: bool,

    #[serde(default)]
    pub total_duration: Option<u64>,

    #[serde(default)]
    pub eval_count: Option<u64>,
}

impl ChatResponse {
    /// The assistant text of this response
    pub fn text(&self) -> &str {
        &self.message.content
    }
}

/// Streaming chunk (text delta or the accumulated final text)
#[derive(Debug, Clone)]
pub enum StreamChunk {
    /// Incremental text
    TextDelta(String),
    /// Full accumulated text, sent once when the stream finishes
    Complete(String),
}

/// Request body for `POST /api/embed`
#[derive(Debug, Clone, Serialize)]
pub struct EmbedRequest {
    pub model: String,
    pub input: Vec<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbedResponse {
    pub model: String,
    pub embeddings: Vec<Vec<f32>>,
}
