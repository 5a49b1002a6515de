// Iterative multi-persona requirements elicitation
//
// Personas are generated for a user request, interviewed in two voices
// (interviewer question, in-character answer), and the collected material
// is judged for sufficiency; insufficient rounds loop back for more
// personas, bounded by the configured round cap, before the final
// requirements document is written.

mod agent;
mod conductor;
mod evaluator;
mod generator;
mod prompts;
mod report;
mod types;

pub use agent::InterviewAgent;
pub use conductor::InterviewConductor;
pub use evaluator::SufficiencyEvaluator;
pub use generator::PersonaGenerator;
pub use report::ReportWriter;
pub use types::{Evaluation, Interview, InterviewState, Persona, PersonaList};
