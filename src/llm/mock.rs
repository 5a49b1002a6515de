// Scripted chat model for tests and offline demos
//
// Pops queued replies in call order; when the queue runs dry it falls back
// to a fixed default reply. Records every request it receives so tests can
// assert on the prompts that were actually sent.

use anyhow::Result;
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::Mutex;
use tokio::sync::mpsc;

use super::types::{ChatMessage, ChatRequest, ChatResponse, StreamChunk};
use super::{ChatModel, Embedder};

pub struct MockChatModel {
    replies: Mutex<VecDeque<String>>,
    default_reply: String,
    requests: Mutex<Vec<ChatRequest>>,
}

impl MockChatModel {
    /// Every call answers with the same fixed text
    pub fn with_reply(reply: impl Into<String>) -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            default_reply: reply.into(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Calls consume the script in order, then fall back to the default
    pub fn with_script(replies: Vec<String>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            default_reply: "mock reply".to_string(),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Set the reply used once the script is exhausted (builder)
    pub fn with_default_reply(mut self, reply: impl Into<String>) -> Self {
        self.default_reply = reply.into();
        self
    }

    fn next_reply(&self) -> String {
        self.replies
            .lock()
            .expect("mock replies lock poisoned")
            .pop_front()
            .unwrap_or_else(|| self.default_reply.clone())
    }

    /// Number of chat calls received so far
    pub fn call_count(&self) -> usize {
        self.requests.lock().expect("mock requests lock poisoned").len()
    }

    /// Copies of every request received, in call order
    pub fn requests(&self) -> Vec<ChatRequest> {
        self.requests
            .lock()
            .expect("mock requests lock poisoned")
            .clone()
    }
}

#[async_trait]
impl ChatModel for MockChatModel {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        self.requests
            .lock()
            .expect("mock requests lock poisoned")
            .push(request.clone());

        Ok(ChatResponse {
            model: "mock".to_string(),
            message: ChatMessage::assistant(self.next_reply()),
            done: true,
            total_duration: None,
            eval_count: None,
        })
    }

    async fn chat_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<mpsc::Receiver<Result<StreamChunk>>> {
        let reply = self.chat(request).await?.message.content;
        let (tx, rx) = mpsc::channel(8);

        tokio::spawn(async move {
            // Two deltas exercise accumulation on the consumer side
            let mut mid = reply.len() / 2;
            while !reply.is_char_boundary(mid) {
                mid -= 1;
            }
            let (head, tail) = reply.split_at(mid);
            for part in [head, tail] {
                if !part.is_empty()
                    && tx
                        .send(Ok(StreamChunk::TextDelta(part.to_string())))
                        .await
                        .is_err()
                {
                    return;
                }
            }
            let _ = tx.send(Ok(StreamChunk::Complete(reply))).await;
        });

        Ok(rx)
    }

    fn name(&self) -> &str {
        "mock"
    }

    fn default_model(&self) -> &str {
        "mock"
    }
}

/// Deterministic embedder for tests: maps each text onto a small vector
/// derived from its bytes, so equal texts embed equally and different texts
/// (almost always) differ.
pub struct MockEmbedder;

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                let mut v = [0f32; 8];
                for (i, b) in t.bytes().enumerate() {
                    v[i % 8] += b as f32;
                }
                v.to_vec()
            })
            .collect())
    }
}
