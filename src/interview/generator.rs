// Persona generation

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::llm::{chat_structured, ChatModel, ChatRequest};

use super::prompts;
use super::types::{Persona, PersonaList};

/// Generates diverse personas for requirements gathering
pub struct PersonaGenerator {
    model: Arc<dyn ChatModel>,
    k: u32,
}

impl PersonaGenerator {
    pub fn new(model: Arc<dyn ChatModel>, k: u32) -> Self {
        Self { model, k }
    }

    /// Generate `k` personas for the given request
    pub async fn run(&self, user_request: &str) -> Result<Vec<Persona>> {
        let request = ChatRequest::from_prompts(
            prompts::PERSONA_SYSTEM,
            prompts::persona_prompt(self.k, user_request),
        );

        let list: PersonaList = chat_structured(self.model.as_ref(), request)
            .await
            .context("Persona generation failed")?;

        if list.personas.is_empty() {
            anyhow::bail!("Model generated no personas");
        }

        tracing::debug!(count = list.personas.len(), "Generated personas");
        Ok(list.personas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockChatModel;

    #[tokio::test]
    async fn test_run_parses_personas() {
        let model = Arc::new(MockChatModel::with_reply(
            r#"{"personas":[{"name":"Ada","background":"Platform engineer"},
                            {"name":"Ben","background":"Product manager"}]}"#,
        ));
        let generator = PersonaGenerator::new(model, 2);
        let personas = generator.run("a build cache").await.unwrap();
        assert_eq!(personas.len(), 2);
        assert_eq!(personas[0].name, "Ada");
    }

    #[tokio::test]
    async fn test_run_rejects_empty_list() {
        let model = Arc::new(MockChatModel::with_reply(r#"{"personas":[]}"#));
        let generator = PersonaGenerator::new(model, 5);
        assert!(generator.run("anything").await.is_err());
    }

    #[tokio::test]
    async fn test_prompt_carries_request_and_count() {
        let model = Arc::new(MockChatModel::with_reply(
            r#"{"personas":[{"name":"A","background":"B"}]}"#,
        ));
        let generator = PersonaGenerator::new(model.clone(), 3);
        generator.run("an edge proxy").await.unwrap();

        let sent = model.requests();
        assert!(sent[0].messages[1].content.contains("3 diverse personas"));
        assert!(sent[0].messages[1].content.contains("an edge proxy"));
    }
}
