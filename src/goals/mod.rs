// Goal refinement: make the goal behind a query explicit, then optimize
// it against SMART criteria

use std::sync::Arc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::llm::{chat_structured, ChatModel, ChatRequest};

const PLANNER_SYSTEM: &str =
    "You are a goal-setting specialist. You turn a user's request into one \
     explicit, actionable goal. \
     You MUST respond with valid JSON only, with this exact shape: \
     {\"description\": \"...\"}";

fn planner_prompt(query: &str) -> String {
    format!(
        "State the concrete goal behind the following request.\n\n\
         Request:\n{query}\n\n\
         Constraints:\n\
         1. The only actions available are researching on the internet and \
         writing a report for the user.\n\
         2. The goal must be achievable through those actions alone."
    )
}

const OPTIMIZER_SYSTEM: &str =
    "You are a goal-setting specialist. You optimize goals against the \
     SMART principles (Specific, Measurable, Achievable, Relevant, \
     Time-bound). \
     You MUST respond with valid JSON only, with this exact shape: \
     {\"description\": \"...\", \"metrics\": \"...\"}";

fn optimizer_prompt(goal: &str) -> String {
    format!(
        "Optimize the following goal against the SMART principles.\n\n\
         Original goal:\n{goal}\n\n\
         Instructions:\n\
         1. Analyze the original goal and identify missing elements and \
         room for improvement.\n\
         2. The only actions available are researching on the internet and \
         writing a report for the user; never plan any other action.\n\
         3. Rewrite the goal to be specific and concrete, with no abstract \
         wording; every word must be actionable and precise.\n\
         4. Describe concretely how achievement of the goal will be \
         measured.\n\
         5. If the original goal has no deadline, do not invent one."
    )
}

/// An explicit goal extracted from a user query
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Goal {
    pub description: String,
}

impl Goal {
    pub fn text(&self) -> &str {
        &self.description
    }
}

/// A SMART-optimized goal with its measurement criteria
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OptimizedGoal {
    pub description: String,
    pub metrics: String,
}

impl OptimizedGoal {
    pub fn text(&self) -> String {
        format!("{} (measured by: {})", self.description, self.metrics)
    }
}

/// Makes the implicit goal in a query explicit
pub struct GoalPlanner {
    model: Arc<dyn ChatModel>,
}

impl GoalPlanner {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn run(&self, query: &str) -> Result<Goal> {
        chat_structured(
            self.model.as_ref(),
            ChatRequest::from_prompts(PLANNER_SYSTEM, planner_prompt(query)),
        )
        .await
        .context("Goal extraction failed")
    }
}

/// Rewrites a goal against the SMART criteria
pub struct GoalOptimizer {
    model: Arc<dyn ChatModel>,
}

impl GoalOptimizer {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn run(&self, goal: &str) -> Result<OptimizedGoal> {
        chat_structured(
            self.model.as_ref(),
            ChatRequest::from_prompts(OPTIMIZER_SYSTEM, optimizer_prompt(goal)),
        )
        .await
        .context("Goal optimization failed")
    }
}

/// Extract and optimize in one pass
pub async fn refine(model: Arc<dyn ChatModel>, query: &str) -> Result<OptimizedGoal> {
    let goal = GoalPlanner::new(model.clone()).run(query).await?;
    GoalOptimizer::new(model).run(goal.text()).await
}
