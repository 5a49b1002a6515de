// The documentation agent: interview workflow wiring
//
// generate_personas -> conduct_interviews -> evaluate_information
//   -> (loop back while insufficient and under the round cap)
//   -> write_report

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::mpsc;

use crate::config::WorkflowConfig;
use crate::llm::{ChatModel, StreamChunk};
use crate::workflow::{CompiledWorkflow, Next, Node, Workflow};

use super::conductor::InterviewConductor;
use super::evaluator::SufficiencyEvaluator;
use super::generator::PersonaGenerator;
use super::report::ReportWriter;
use super::types::{InterviewState, Persona};

struct GeneratePersonas {
    generator: Arc<PersonaGenerator>,
}

#[async_trait]
impl Node<InterviewState> for GeneratePersonas {
    fn id(&self) -> &str {
        "generate_personas"
    }

    async fn run(&self, mut state: InterviewState) -> Result<(InterviewState, Next)> {
        let personas = self.generator.run(&state.user_request).await?;
        state.personas.extend(personas);
        state.iteration += 1;
        Ok((state, Next::Continue))
    }
}

struct ConductInterviews {
    conductor: Arc<InterviewConductor>,
    recent_window: usize,
}

#[async_trait]
impl Node<InterviewState> for ConductInterviews {
    fn id(&self) -> &str {
        "conduct_interviews"
    }

    async fn run(&self, mut state: InterviewState) -> Result<(InterviewState, Next)> {
        // Only the personas added by recent rounds; earlier ones were
        // already interviewed
        let start = state.personas.len().saturating_sub(self.recent_window);
        let window: Vec<Persona> = state.personas[start..].to_vec();

        let interviews = self.conductor.run(&state.user_request, &window).await?;
        state.interviews.extend(interviews);
        Ok((state, Next::Continue))
    }
}

struct EvaluateInformation {
    evaluator: Arc<SufficiencyEvaluator>,
    max_iterations: u32,
}

#[async_trait]
impl Node<InterviewState> for EvaluateInformation {
    fn id(&self) -> &str {
        "evaluate_information"
    }

    async fn run(&self, mut state: InterviewState) -> Result<(InterviewState, Next)> {
        let evaluation = self
            .evaluator
            .run(&state.user_request, &state.interviews)
            .await?;
        state.is_sufficient = evaluation.is_sufficient;
        state.evaluation_reason = evaluation.reason;

        let next = if !state.is_sufficient && state.iteration < self.max_iterations {
            tracing::info!(
                iteration = state.iteration,
                reason = %state.evaluation_reason,
                "Information insufficient; generating more personas"
            );
            Next::Goto("generate_personas".to_string())
        } else {
            Next::Continue
        };
        Ok((state, next))
    }
}

struct WriteReport {
    writer: Arc<ReportWriter>,
}

#[async_trait]
impl Node<InterviewState> for WriteReport {
    fn id(&self) -> &str {
        "write_report"
    }

    async fn run(&self, mut state: InterviewState) -> Result<(InterviewState, Next)> {
        state.report = self
            .writer
            .run(&state.user_request, &state.interviews)
            .await?;
        Ok((state, Next::End))
    }
}

/// Iterative multi-persona requirements elicitation
pub struct InterviewAgent {
    workflow: CompiledWorkflow<InterviewState>,
    generator: Arc<PersonaGenerator>,
    conductor: Arc<InterviewConductor>,
    writer: Arc<ReportWriter>,
    recent_window: usize,
}

impl InterviewAgent {
    pub fn new(model: Arc<dyn ChatModel>, config: &WorkflowConfig) -> Result<Self> {
        let generator = Arc::new(PersonaGenerator::new(
            model.clone(),
            config.personas_per_round,
        ));
        let conductor = Arc::new(InterviewConductor::new(model.clone()));
        let evaluator = Arc::new(SufficiencyEvaluator::new(model.clone()));
        let writer = Arc::new(ReportWriter::new(model));

        let mut workflow = Workflow::new();
        workflow
            .add_node(Box::new(GeneratePersonas {
                generator: generator.clone(),
            }))
            .add_node(Box::new(ConductInterviews {
                conductor: conductor.clone(),
                recent_window: config.recent_window,
            }))
            .add_node(Box::new(EvaluateInformation {
                evaluator,
                max_iterations: config.max_iterations,
            }))
            .add_node(Box::new(WriteReport {
                writer: writer.clone(),
            }));
        workflow
            .add_edge("generate_personas")
            .add_edge("conduct_interviews")
            .add_edge("evaluate_information")
            .add_edge("write_report");

        Ok(Self {
            workflow: workflow.compile()?,
            generator,
            conductor,
            writer,
            recent_window: config.recent_window,
        })
    }

    /// Run the full workflow and return the final state (report included)
    pub async fn run(&self, user_request: &str) -> Result<InterviewState> {
        self.workflow.invoke(InterviewState::new(user_request)).await
    }

    /// Run one persona/interview round without evaluation, then stream the
    /// report
    pub async fn stream_report(
        &self,
        user_request: &str,
    ) -> Result<mpsc::Receiver<Result<StreamChunk>>> {
        let mut state = InterviewState::new(user_request);
        state.personas = self.generator.run(user_request).await?;

        let start = state.personas.len().saturating_sub(self.recent_window);
        state.interviews = self
            .conductor
            .run(user_request, &state.personas[start..])
            .await?;

        self.writer.stream(user_request, &state.interviews).await
    }
}
