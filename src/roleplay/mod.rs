// Role-routed Q&A with judged retry
//
// select_role -> answer -> judge -> (switch role and answer again while
// rejected and under the retry cap)
//
// The retry loop is bounded: each rejection switches to the next untried
// role, and the loop stops once the cap is hit even if the judge never
// approves.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::config::WorkflowConfig;
use crate::llm::{chat_structured, ChatModel, ChatRequest};
use crate::workflow::{CompiledWorkflow, Next, Node, Workflow};

mod prompts;
pub mod roles;

pub use roles::{RoleProfile, ROLES};

/// Structured verdict from the judge step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Judgment {
    pub approved: bool,
    pub reason: String,
}

/// State threaded through the roleplay workflow
#[derive(Debug, Clone)]
pub struct RoleplayState {
    pub query: String,
    pub current_role: String,
    pub tried_roles: Vec<String>,
    pub answer: String,
    pub approved: bool,
    pub judge_reason: String,
    pub attempts: u32,
    /// Human-readable step log, one line per node run
    pub messages: Vec<String>,
}

impl RoleplayState {
    fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            current_role: String::new(),
            tried_roles: Vec::new(),
            answer: String::new(),
            approved: false,
            judge_reason: String::new(),
            attempts: 0,
            messages: Vec::new(),
        }
    }
}

/// Final outcome of a roleplay run
#[derive(Debug, Clone)]
pub struct RoleplayOutcome {
    pub query: String,
    pub role: String,
    pub answer: String,
    pub approved: bool,
    pub judge_reason: String,
    pub attempts: u32,
    pub transcript: Vec<String>,
}

impl From<RoleplayState> for RoleplayOutcome {
    fn from(state: RoleplayState) -> Self {
        Self {
            query: state.query,
            role: state.current_role,
            answer: state.answer,
            approved: state.approved,
            judge_reason: state.judge_reason,
            attempts: state.attempts,
            transcript: state.messages,
        }
    }
}

struct SelectRole {
    model: Arc<dyn ChatModel>,
}

#[async_trait]
impl Node<RoleplayState> for SelectRole {
    fn id(&self) -> &str {
        "select_role"
    }

    async fn run(&self, mut state: RoleplayState) -> Result<(RoleplayState, Next)> {
        let request = ChatRequest::from_prompts(
            prompts::SELECT_SYSTEM,
            prompts::select_prompt(&state.query, &roles::catalog_for_prompt()),
        );
        let response = self.model.chat(&request).await?;
        let role = roles::resolve_role(response.text());

        state.current_role = role.key.to_string();
        state.tried_roles.push(role.key.to_string());
        state.messages.push(format!("Selected role: {}", role.key));
        Ok((state, Next::Continue))
    }
}

struct Answer {
    model: Arc<dyn ChatModel>,
}

#[async_trait]
impl Node<RoleplayState> for Answer {
    fn id(&self) -> &str {
        "answer"
    }

    async fn run(&self, mut state: RoleplayState) -> Result<(RoleplayState, Next)> {
        let role = roles::resolve_role(&state.current_role);
        let request =
            ChatRequest::from_prompts(role.voice, prompts::answer_prompt(&state.query));
        let response = self.model.chat(&request).await?;

        state.answer = response.text().trim().to_string();
        state.attempts += 1;
        state.messages.push(format!("Answer: {}", state.answer));
        Ok((state, Next::Continue))
    }
}

struct Judge {
    model: Arc<dyn ChatModel>,
    max_retries: u32,
}

#[async_trait]
impl Node<RoleplayState> for Judge {
    fn id(&self) -> &str {
        "judge"
    }

    async fn run(&self, mut state: RoleplayState) -> Result<(RoleplayState, Next)> {
        let request = ChatRequest::from_prompts(
            prompts::JUDGE_SYSTEM,
            prompts::judge_prompt(&state.query, &state.current_role, &state.answer),
        );
        let judgment: Judgment = chat_structured(self.model.as_ref(), request).await?;

        state.approved = judgment.approved;
        state.judge_reason = judgment.reason;
        state
            .messages
            .push(format!("Judgment: approved={}", state.approved));

        if state.approved {
            return Ok((state, Next::End));
        }
        if state.attempts >= self.max_retries {
            tracing::info!(
                attempts = state.attempts,
                "Judge kept rejecting; giving up after the retry cap"
            );
            return Ok((state, Next::End));
        }
        Ok((state, Next::Continue))
    }
}

struct SwitchRole;

#[async_trait]
impl Node<RoleplayState> for SwitchRole {
    fn id(&self) -> &str {
        "switch_role"
    }

    async fn run(&self, mut state: RoleplayState) -> Result<(RoleplayState, Next)> {
        let next_role = roles::next_untried_role(&state.current_role, &state.tried_roles);
        state.current_role = next_role.key.to_string();
        state.tried_roles.push(next_role.key.to_string());
        state
            .messages
            .push(format!("Retrying with a different role: {}", next_role.key));
        Ok((state, Next::Goto("answer".to_string())))
    }
}

/// Answer a query in the voice of an auto-selected role, retrying with
/// other roles while the judge rejects the answer
pub struct RoleAgent {
    workflow: CompiledWorkflow<RoleplayState>,
}

impl RoleAgent {
    pub fn new(model: Arc<dyn ChatModel>, config: &WorkflowConfig) -> Result<Self> {
        let mut workflow = Workflow::new();
        workflow
            .add_node(Box::new(SelectRole {
                model: model.clone(),
            }))
            .add_node(Box::new(Answer {
                model: model.clone(),
            }))
            .add_node(Box::new(Judge {
                model,
                max_retries: config.max_role_retries,
            }))
            .add_node(Box::new(SwitchRole));
        workflow
            .add_edge("select_role")
            .add_edge("answer")
            .add_edge("judge")
            .add_edge("switch_role");

        Ok(Self {
            workflow: workflow.compile()?,
        })
    }

    pub async fn run(&self, query: &str) -> Result<RoleplayOutcome> {
        let state = self.workflow.invoke(RoleplayState::new(query)).await?;
        Ok(state.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockChatModel;

    #[tokio::test]
    async fn test_approved_on_first_attempt() {
        let model = Arc::new(MockChatModel::with_script(vec![
            "technical".to_string(),
            "Use a BufReader.".to_string(),
            r#"{"approved": true, "reason": "complete and correct"}"#.to_string(),
        ]));
        let agent = RoleAgent::new(model, &WorkflowConfig::default()).unwrap();
        let outcome = agent.run("How do I read a file in Rust?").await.unwrap();

        assert!(outcome.approved);
        assert_eq!(outcome.role, "technical");
        assert_eq!(outcome.answer, "Use a BufReader.");
        assert_eq!(outcome.attempts, 1);
    }

    #[tokio::test]
    async fn test_rejection_switches_role_then_approves() {
        let model = Arc::new(MockChatModel::with_script(vec![
            "technical".to_string(),
            "first answer".to_string(),
            r#"{"approved": false, "reason": "too shallow"}"#.to_string(),
            "second answer".to_string(),
            r#"{"approved": true, "reason": "good"}"#.to_string(),
        ]));
        let agent = RoleAgent::new(model, &WorkflowConfig::default()).unwrap();
        let outcome = agent.run("Explain ownership").await.unwrap();

        assert!(outcome.approved);
        // technical was tried first, so the retry moved to business
        assert_eq!(outcome.role, "business");
        assert_eq!(outcome.answer, "second answer");
        assert_eq!(outcome.attempts, 2);
        assert!(outcome
            .transcript
            .iter()
            .any(|m| m.contains("Retrying with a different role: business")));
    }

    #[tokio::test]
    async fn test_retry_cap_stops_the_loop() {
        // Selector, then (answer + rejection) repeated forever
        let model = Arc::new(
            MockChatModel::with_script(vec!["general".to_string()])
                .with_default_reply(r#"{"approved": false, "reason": "no"}"#),
        );
        let config = WorkflowConfig {
            max_role_retries: 3,
            ..Default::default()
        };
        let agent = RoleAgent::new(model, &config).unwrap();
        let outcome = agent.run("Unanswerable question").await.unwrap();

        assert!(!outcome.approved);
        assert_eq!(outcome.attempts, 3);
    }

    #[tokio::test]
    async fn test_unrecognized_selector_output_falls_back_to_general() {
        let model = Arc::new(MockChatModel::with_script(vec![
            "I think a philosopher should answer this".to_string(),
            "an answer".to_string(),
            r#"{"approved": true, "reason": "fine"}"#.to_string(),
        ]));
        let agent = RoleAgent::new(model, &WorkflowConfig::default()).unwrap();
        let outcome = agent.run("What is the meaning of life?").await.unwrap();
        assert_eq!(outcome.role, "general");
    }
}
