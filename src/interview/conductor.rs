// Interview conducting: one question and one in-character answer per persona

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::try_join_all;

use crate::llm::{ChatModel, ChatRequest};

use super::prompts;
use super::types::{Interview, Persona};

/// Conducts interviews with personas to gather requirements
pub struct InterviewConductor {
    model: Arc<dyn ChatModel>,
}

impl InterviewConductor {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    /// Interview every given persona: generate questions, then answers,
    /// then zip them into interview records. Both phases fan out
    /// concurrently across personas.
    pub async fn run(&self, user_request: &str, personas: &[Persona]) -> Result<Vec<Interview>> {
        let questions = self.generate_questions(user_request, personas).await?;
        let answers = self.generate_answers(personas, &questions).await?;

        Ok(personas
            .iter()
            .zip(questions)
            .zip(answers)
            .map(|((persona, question), answer)| Interview {
                persona: persona.clone(),
                question,
                answer,
            })
            .collect())
    }

    async fn generate_questions(
        &self,
        user_request: &str,
        personas: &[Persona],
    ) -> Result<Vec<String>> {
        let calls = personas.iter().map(|persona| {
            let request = ChatRequest::from_prompts(
                prompts::QUESTION_SYSTEM,
                prompts::question_prompt(user_request, &persona.name, &persona.background),
            );
            async move {
                let response = self.model.chat(&request).await?;
                Ok::<String, anyhow::Error>(response.text().trim().to_string())
            }
        });

        try_join_all(calls).await.context("Question generation failed")
    }

    async fn generate_answers(
        &self,
        personas: &[Persona],
        questions: &[String],
    ) -> Result<Vec<String>> {
        let calls = personas.iter().zip(questions).map(|(persona, question)| {
            let request = ChatRequest::from_prompts(
                prompts::answer_system(&persona.name, &persona.background),
                prompts::answer_prompt(question),
            );
            async move {
                let response = self.model.chat(&request).await?;
                Ok::<String, anyhow::Error>(response.text().trim().to_string())
            }
        });

        try_join_all(calls).await.context("Answer generation failed")
    }
}
