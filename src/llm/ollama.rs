// HTTP client for a local Ollama server
//
// Talks to `/api/chat` (plain, streaming, and JSON-constrained) and
// `/api/embed`. Streaming replies are NDJSON: one ChatResponse-shaped
// object per line, `done: true` on the terminal line.

use anyhow::{Context, Result};
use async_trait::async_trait;
use futures::stream::StreamExt;
use reqwest::Client;
use std::time::Duration;
use tokio::sync::mpsc;

use super::retry::with_retry;
use super::types::{ChatRequest, ChatResponse, EmbedRequest, EmbedResponse, StreamChunk};
use super::{ChatModel, Embedder};
use crate::config::OllamaConfig;

/// Client for a locally hosted Ollama server
#[derive(Clone)]
pub struct OllamaClient {
    client: Client,
    base_url: String,
    chat_model: String,
    embed_model: String,
    temperature: f32,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            chat_model: config.chat_model.clone(),
            embed_model: config.embed_model.clone(),
            temperature: config.temperature,
        })
    }

    /// Fill in client-level defaults the request leaves unset
    fn resolve(&self, request: &ChatRequest) -> ChatRequest {
        let mut resolved = request.clone();
        if resolved.model.is_empty() {
            resolved.model = self.chat_model.clone();
        }
        let options = resolved.options.get_or_insert_with(Default::default);
        if options.temperature.is_none() {
            options.temperature = Some(self.temperature);
        }
        resolved
    }

    /// Send a single chat request (no retry)
    async fn chat_once(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let body = self.resolve(request);
        let url = format!("{}/api/chat", self.base_url);

        tracing::debug!(model = %body.model, "Sending request to Ollama");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send request to Ollama")?;

        let status = response.status();

        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Ollama request failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        let chat_response: ChatResponse = response
            .json()
            .await
            .context("Failed to parse Ollama response")?;

        tracing::debug!(
            eval_count = ?chat_response.eval_count,
            "Received response from Ollama"
        );

        Ok(chat_response)
    }

    /// Send a streaming chat request (no retry)
    async fn chat_stream_once(
        &self,
        request: &ChatRequest,
    ) -> Result<mpsc::Receiver<Result<StreamChunk>>> {
        let (tx, rx) = mpsc::channel(100);

        let mut body = self.resolve(request);
        body.stream = true;

        let url = format!("{}/api/chat", self.base_url);

        tracing::debug!(model = %body.model, "Sending streaming request to Ollama");

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send streaming request to Ollama")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Ollama streaming request failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        // Parse the NDJSON stream on a background task
        tokio::spawn(async move {
            let mut stream = response.bytes_stream();
            let mut buffer = Vec::new();
            let mut accumulated = String::new();
            let mut done = false;

            while let Some(chunk) = stream.next().await {
                if done {
                    break;
                }

                match chunk {
                    Ok(bytes) => {
                        buffer.extend_from_slice(&bytes);

                        while let Some(newline_pos) = buffer.iter().position(|&b| b == b'\n') {
                            let line_bytes: Vec<u8> = buffer.drain(..=newline_pos).collect();
                            let line = String::from_utf8_lossy(&line_bytes);
                            let line = line.trim();
                            if line.is_empty() {
                                continue;
                            }

                            let parsed: ChatResponse = match serde_json::from_str(line) {
                                Ok(p) => p,
                                Err(e) => {
                                    tracing::warn!("Skipping unparseable stream line: {}", e);
                                    continue;
                                }
                            };

                            let delta = parsed.message.content;
                            if !delta.is_empty() {
                                accumulated.push_str(&delta);
                                if tx.send(Ok(StreamChunk::TextDelta(delta))).await.is_err() {
                                    done = true;
                                    break;
                                }
                            }

                            if parsed.done {
                                let _ = tx
                                    .send(Ok(StreamChunk::Complete(accumulated.clone())))
                                    .await;
                                done = true;
                                break;
                            }
                        }
                    }
                    Err(e) => {
                        tracing::error!("Stream error: {}", e);
                        let _ = tx.send(Err(e.into())).await;
                        break;
                    }
                }
            }

            tracing::debug!("Ollama streaming task finished");
        });

        Ok(rx)
    }

    async fn embed_once(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let url = format!("{}/api/embed", self.base_url);
        let body = EmbedRequest {
            model: self.embed_model.clone(),
            input: texts.to_vec(),
        };

        let response = self
            .client
            .post(&url)
            .header("content-type", "application/json")
            .json(&body)
            .send()
            .await
            .context("Failed to send embed request to Ollama")?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Ollama embed request failed\n\nStatus: {}\nBody: {}",
                status,
                error_body
            );
        }

        let embed_response: EmbedResponse = response
            .json()
            .await
            .context("Failed to parse Ollama embed response")?;

        if embed_response.embeddings.len() != texts.len() {
            anyhow::bail!(
                "Ollama returned {} embeddings for {} inputs",
                embed_response.embeddings.len(),
                texts.len()
            );
        }

        Ok(embed_response.embeddings)
    }
}

#[async_trait]
impl ChatModel for OllamaClient {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        with_retry(|| self.chat_once(request)).await
    }

    async fn chat_stream(
        &self,
        request: &ChatRequest,
    ) -> Result<mpsc::Receiver<Result<StreamChunk>>> {
        with_retry(|| self.chat_stream_once(request)).await
    }

    fn name(&self) -> &str {
        "ollama"
    }

    fn default_model(&self) -> &str {
        &self.chat_model
    }
}

#[async_trait]
impl Embedder for OllamaClient {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        with_retry(|| self.embed_once(texts)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = OllamaClient::new(&OllamaConfig::default());
        assert!(client.is_ok());
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let config = OllamaConfig {
            base_url: "http://localhost:11434/".to_string(),
            ..Default::default()
        };
        let client = OllamaClient::new(&config).unwrap();
        assert_eq!(client.base_url, "http://localhost:11434");
    }

    #[test]
    fn test_resolve_fills_defaults() {
        let client = OllamaClient::new(&OllamaConfig::default()).unwrap();
        let resolved = client.resolve(&ChatRequest::new(vec![]));
        assert_eq!(resolved.model, client.chat_model);
        assert_eq!(
            resolved.options.unwrap().temperature,
            Some(client.temperature)
        );
    }

    #[test]
    fn test_resolve_keeps_explicit_values() {
        let client = OllamaClient::new(&OllamaConfig::default()).unwrap();
        let request = ChatRequest::new(vec![])
            .with_model("qwen2.5:7b")
            .with_temperature(0.9);
        let resolved = client.resolve(&request);
        assert_eq!(resolved.model, "qwen2.5:7b");
        assert_eq!(resolved.options.unwrap().temperature, Some(0.9));
    }
}
