// Sequential prompt chains
//
// Each step renders its template with the previous step's output and sends
// it to the model; an optional finisher post-processes the final text.
// `stream` runs every step but the last eagerly and streams the last one.

use std::sync::Arc;

use anyhow::{Context, Result};
use tokio::sync::mpsc;

use crate::llm::{ChatModel, ChatRequest, StreamChunk};

/// One prompt step: a system prompt plus a human template with an
/// `{input}` placeholder
#[derive(Debug, Clone)]
pub struct ChainStep {
    system: String,
    template: String,
}

impl ChainStep {
    pub fn new(system: impl Into<String>, template: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            template: template.into(),
        }
    }

    fn render(&self, input: &str) -> ChatRequest {
        ChatRequest::from_prompts(self.system.as_str(), self.template.replace("{input}", input))
    }
}

type Finisher = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// A linear prompt -> model -> prompt -> model pipeline
pub struct Chain {
    model: Arc<dyn ChatModel>,
    steps: Vec<ChainStep>,
    finisher: Option<Finisher>,
}

impl Chain {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self {
            model,
            steps: Vec::new(),
            finisher: None,
        }
    }

    /// Append a step (builder)
    pub fn then(mut self, step: ChainStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Post-process the final output (builder)
    pub fn map(mut self, f: impl Fn(&str) -> String + Send + Sync + 'static) -> Self {
        self.finisher = Some(Arc::new(f));
        self
    }

    /// Run every step and return the final text
    pub async fn run(&self, input: &str) -> Result<String> {
        if self.steps.is_empty() {
            anyhow::bail!("Chain has no steps");
        }

        let mut text = input.to_string();
        for (idx, step) in self.steps.iter().enumerate() {
            let response = self
                .model
                .chat(&step.render(&text))
                .await
                .with_context(|| format!("Chain step {} failed", idx + 1))?;
            text = response.text().trim().to_string();
        }

        Ok(match &self.finisher {
            Some(f) => f(&text),
            None => text,
        })
    }

    /// Run every step but the last, then stream the last step's output.
    /// The finisher is applied to each delta and to the final text.
    pub async fn stream(&self, input: &str) -> Result<mpsc::Receiver<Result<StreamChunk>>> {
        let (last, head) = self
            .steps
            .split_last()
            .ok_or_else(|| anyhow::anyhow!("Chain has no steps"))?;

        let mut text = input.to_string();
        for (idx, step) in head.iter().enumerate() {
            let response = self
                .model
                .chat(&step.render(&text))
                .await
                .with_context(|| format!("Chain step {} failed", idx + 1))?;
            text = response.text().trim().to_string();
        }

        let inner = self.model.chat_stream(&last.render(&text)).await?;

        let Some(finisher) = self.finisher.clone() else {
            return Ok(inner);
        };

        // Relay the stream through the finisher
        let (tx, rx) = mpsc::channel(100);
        let mut inner = inner;
        tokio::spawn(async move {
            while let Some(chunk) = inner.recv().await {
                let mapped = chunk.map(|c| match c {
                    StreamChunk::TextDelta(d) => StreamChunk::TextDelta(finisher(&d)),
                    StreamChunk::Complete(c) => StreamChunk::Complete(finisher(&c)),
                });
                if tx.send(mapped).await.is_err() {
                    break;
                }
            }
        });

        Ok(rx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockChatModel;

    #[tokio::test]
    async fn test_two_step_chain_feeds_output_forward() {
        let model = Arc::new(MockChatModel::with_script(vec![
            "a recipe".to_string(),
            "flour, eggs".to_string(),
        ]));
        let chain = Chain::new(model.clone())
            .then(ChainStep::new("Think recipe from user input dish", "{input}"))
            .then(ChainStep::new("Tell me material for your recipe only", "{input}"));

        let out = chain.run("pasta").await.unwrap();
        assert_eq!(out, "flour, eggs");

        // Step 2 received step 1's output
        let sent = model.requests();
        assert_eq!(sent[1].messages[1].content, "a recipe");
    }

    #[tokio::test]
    async fn test_finisher_transforms_final_output() {
        let model = Arc::new(MockChatModel::with_reply("quiet text"));
        let chain = Chain::new(model)
            .then(ChainStep::new("echo", "{input}"))
            .map(|s| s.to_uppercase());
        assert_eq!(chain.run("x").await.unwrap(), "QUIET TEXT");
    }

    #[tokio::test]
    async fn test_empty_chain_is_an_error() {
        let model = Arc::new(MockChatModel::with_reply("unused"));
        let chain = Chain::new(model);
        assert!(chain.run("x").await.is_err());
        assert!(chain.stream("x").await.is_err());
    }

    #[tokio::test]
    async fn test_stream_applies_finisher_to_chunks() {
        let model = Arc::new(MockChatModel::with_reply("ab"));
        let chain = Chain::new(model)
            .then(ChainStep::new("echo", "{input}"))
            .map(|s| s.to_uppercase());

        let mut rx = chain.stream("x").await.unwrap();
        let mut deltas = String::new();
        let mut complete = None;
        while let Some(chunk) = rx.recv().await {
            match chunk.unwrap() {
                StreamChunk::TextDelta(d) => deltas.push_str(&d),
                StreamChunk::Complete(c) => complete = Some(c),
            }
        }
        assert_eq!(deltas, "AB");
        assert_eq!(complete.as_deref(), Some("AB"));
    }

    #[tokio::test]
    async fn test_template_placeholder_substitution() {
        let model = Arc::new(MockChatModel::with_reply("ok"));
        let chain = Chain::new(model.clone())
            .then(ChainStep::new("sys", "Dish: {input}. List steps."));
        chain.run("pasta").await.unwrap();
        assert_eq!(
            model.requests()[0].messages[1].content,
            "Dish: pasta. List steps."
        );
    }
}
