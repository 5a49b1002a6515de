// Sufficiency evaluation

use std::sync::Arc;

use anyhow::{Context, Result};

use crate::llm::{chat_structured, ChatModel, ChatRequest};

use super::prompts;
use super::types::{interviews_digest, Evaluation, Interview};

/// Judges whether the collected interviews support a complete requirements
/// document
pub struct SufficiencyEvaluator {
    model: Arc<dyn ChatModel>,
}

impl SufficiencyEvaluator {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn run(&self, user_request: &str, interviews: &[Interview]) -> Result<Evaluation> {
        let request = ChatRequest::from_prompts(
            prompts::EVALUATION_SYSTEM,
            prompts::evaluation_prompt(user_request, &interviews_digest(interviews)),
        );

        let evaluation: Evaluation = chat_structured(self.model.as_ref(), request)
            .await
            .context("Sufficiency evaluation failed")?;

        tracing::debug!(
            sufficient = evaluation.is_sufficient,
            "Evaluated interview sufficiency"
        );
        Ok(evaluation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockChatModel;

    #[tokio::test]
    async fn test_run_parses_judgment() {
        let model = Arc::new(MockChatModel::with_reply(
            r#"{"reason":"covers all user groups","is_sufficient":true}"#,
        ));
        let evaluator = SufficiencyEvaluator::new(model);
        let evaluation = evaluator.run("a thing", &[]).await.unwrap();
        assert!(evaluation.is_sufficient);
        assert_eq!(evaluation.reason, "covers all user groups");
    }

    #[tokio::test]
    async fn test_garbage_judgment_is_an_error() {
        let model = Arc::new(MockChatModel::with_reply("maybe?"));
        let evaluator = SufficiencyEvaluator::new(model);
        assert!(evaluator.run("a thing", &[]).await.is_err());
    }
}
