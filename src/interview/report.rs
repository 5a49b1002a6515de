// Requirements document synthesis

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::llm::{ChatModel, ChatRequest, StreamChunk};

use super::prompts;
use super::types::{interviews_digest, Interview};

/// Writes the final requirements document from the interview results
pub struct ReportWriter {
    model: Arc<dyn ChatModel>,
}

impl ReportWriter {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    fn request(&self, user_request: &str, interviews: &[Interview]) -> ChatRequest {
        ChatRequest::from_prompts(
            prompts::REPORT_SYSTEM,
            prompts::report_prompt(user_request, &interviews_digest(interviews)),
        )
    }

    /// Generate the document in one call
    pub async fn run(&self, user_request: &str, interviews: &[Interview]) -> Result<String> {
        let response = self
            .model
            .chat(&self.request(user_request, interviews))
            .await
            .context("Report generation failed")?;
        Ok(response.text().to_string())
    }

    /// Stream the document as it is generated
    pub async fn stream(
        &self,
        user_request: &str,
        interviews: &[Interview],
    ) -> Result<mpsc::Receiver<Result<StreamChunk>>> {
        self.model
            .chat_stream(&self.request(user_request, interviews))
            .await
            .context("Report streaming failed")
    }
}
