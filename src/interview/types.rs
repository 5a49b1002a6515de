// Interview workflow records and state

use serde::{Deserialize, Serialize};

/// A synthetic stakeholder used to elicit simulated interview answers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    /// Name of the person
    pub name: String,
    /// Background of the person
    pub background: String,
}

/// Wire shape for structured persona generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersonaList {
    pub personas: Vec<Persona>,
}

/// One (persona, question, answer) triple
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Interview {
    pub persona: Persona,
    pub question: String,
    pub answer: String,
}

/// Structured sufficiency judgment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Evaluation {
    /// Reason for the judgment
    pub reason: String,
    /// Whether the gathered information suffices for a requirements document
    pub is_sufficient: bool,
}

/// State threaded through the interview workflow
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InterviewState {
    /// Request from the user
    pub user_request: String,
    /// Personas accumulated across generation rounds
    pub personas: Vec<Persona>,
    /// Interviews accumulated across rounds
    pub interviews: Vec<Interview>,
    /// Generated requirements document
    pub report: String,
    /// Completed persona-generation rounds
    pub iteration: u32,
    /// Last sufficiency judgment
    pub is_sufficient: bool,
    /// Reason for the last judgment
    pub evaluation_reason: String,
}

impl InterviewState {
    pub fn new(user_request: impl Into<String>) -> Self {
        Self {
            user_request: user_request.into(),
            personas: Vec::new(),
            interviews: Vec::new(),
            report: String::new(),
            iteration: 0,
            is_sufficient: false,
            evaluation_reason: String::new(),
        }
    }
}

/// Render interviews in the block form the evaluation and report prompts
/// expect
pub(crate) fn interviews_digest(interviews: &[Interview]) -> String {
    interviews
        .iter()
        .map(|i| {
            format!(
                "Persona: {} - {}\nQuestion: {}\nAnswer: {}\n",
                i.persona.name, i.persona.background, i.question, i.answer
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_is_empty() {
        let state = InterviewState::new("a CLI todo app");
        assert_eq!(state.user_request, "a CLI todo app");
        assert!(state.personas.is_empty());
        assert!(state.interviews.is_empty());
        assert_eq!(state.iteration, 0);
        assert!(!state.is_sufficient);
    }

    #[test]
    fn test_interviews_digest_contains_all_fields() {
        let interviews = vec![Interview {
            persona: Persona {
                name: "Dana".to_string(),
                background: "SRE at a telemetry vendor".to_string(),
            },
            question: "What throughput do you need?".to_string(),
            answer: "Around 50k spans/s.".to_string(),
        }];
        let digest = interviews_digest(&interviews);
        assert!(digest.contains("Dana"));
        assert!(digest.contains("SRE at a telemetry vendor"));
        assert!(digest.contains("What throughput do you need?"));
        assert!(digest.contains("50k spans/s"));
    }

    #[test]
    fn test_persona_list_parses_model_output() {
        let raw = r#"{"personas":[{"name":"Kai","background":"Student"}]}"#;
        let list: PersonaList = serde_json::from_str(raw).unwrap();
        assert_eq!(list.personas.len(), 1);
        assert_eq!(list.personas[0].name, "Kai");
    }
}
