// Transcript logging for model calls
//
// Every chat call can be recorded as one JSONL line (id, timestamp, label,
// prompt, response, model) by wrapping the model in `RecordingModel`.
// Streams are recorded once complete, from the accumulated text.

use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::{Context, Result};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::llm::{ChatModel, ChatRequest, ChatResponse, StreamChunk};

/// A single logged model call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Unique ID for this entry
    pub id: String,

    /// When the call completed
    pub timestamp: DateTime<Utc>,

    /// Which workflow issued the call (e.g. "interview", "hats")
    pub label: String,

    /// The user-turn prompt that was sent
    pub prompt: String,

    /// The assistant text that came back
    pub response: String,

    /// Model that generated the response
    pub model: String,
}

impl TranscriptEntry {
    pub fn new(
        label: impl Into<String>,
        prompt: impl Into<String>,
        response: impl Into<String>,
        model: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            label: label.into(),
            prompt: prompt.into(),
            response: response.into(),
            model: model.into(),
        }
    }
}

/// Appends transcript entries to a JSONL file
pub struct TranscriptLogger {
    log_path: PathBuf,
}

impl TranscriptLogger {
    pub fn new(log_path: PathBuf) -> Result<Self> {
        if let Some(parent) = log_path.parent() {
            std::fs::create_dir_all(parent).context("Failed to create transcript directory")?;
        }
        Ok(Self { log_path })
    }

    pub fn log(&self, entry: &TranscriptEntry) -> Result<()> {
        let line = serde_json::to_string(entry).context("Failed to serialize entry")?;
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.log_path)
            .context("Failed to open transcript file")?;
        writeln!(file, "{}", line).context("Failed to write transcript entry")?;
        Ok(())
    }

    /// Read the whole transcript back (tests and inspection)
    pub fn read_all(&self) -> Result<Vec<TranscriptEntry>> {
        if !self.log_path.exists() {
            return Ok(Vec::new());
        }
        let raw = std::fs::read_to_string(&self.log_path)?;
        raw.lines()
            .filter(|l| !l.trim().is_empty())
            .map(|l| serde_json::from_str(l).context("Malformed transcript line"))
            .collect()
    }
}

/// ChatModel wrapper that records every call to a transcript
pub struct RecordingModel {
    inner: Arc<dyn ChatModel>,
    logger: Arc<Mutex<TranscriptLogger>>,
    label: String,
}

impl RecordingModel {
    pub fn new(inner: Arc<dyn ChatModel>, logger: TranscriptLogger, label: impl Into<String>) -> Self {
        Self {
            inner,
            logger: Arc::new(Mutex::new(logger)),
            label: label.into(),
        }
    }

    fn last_user_prompt(request: &ChatRequest) -> String {
        request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == "user")
            .map(|m| m.content.clone())
            .unwrap_or_default()
    }

    fn record(&self, prompt: String, response: &str, model: &str) {
        let entry = TranscriptEntry::new(self.label.clone(), prompt, response, model);
        let logger = self.logger.lock().expect("transcript lock poisoned");
        if let Err(e) = logger.log(&entry) {
            tracing::warn!("Failed to record transcript entry: {}", e);
        }
    }
}

#[async_trait]
impl ChatModel for RecordingModel {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let response = self.inner.chat(request).await?;
        self.record(
            Self::last_user_prompt(request),
            response.text(),
            &response.model,
        );
        Ok(response)
    }

    async fn chat_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<mpsc::Receiver<Result<StreamChunk>>> {
        let mut inner_rx = self.inner.chat_stream(request).await?;

        let (tx, rx) = mpsc::channel(100);
        let prompt = Self::last_user_prompt(request);
        let label = self.label.clone();
        let model_name = self.inner.default_model().to_string();
        let logger = self.logger.clone();

        tokio::spawn(async move {
            let mut final_text = None;
            while let Some(chunk) = inner_rx.recv().await {
                if let Ok(StreamChunk::Complete(full)) = &chunk {
                    final_text = Some(full.clone());
                }
                if tx.send(chunk).await.is_err() {
                    break;
                }
            }
            if let Some(text) = final_text {
                let entry = TranscriptEntry::new(label, prompt, text, model_name);
                let logger = logger.lock().expect("transcript lock poisoned");
                if let Err(e) = logger.log(&entry) {
                    tracing::warn!("Failed to record streamed transcript entry: {}", e);
                }
            }
        });

        Ok(rx)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }

    fn default_model(&self) -> &str {
        self.inner.default_model()
    }
}
