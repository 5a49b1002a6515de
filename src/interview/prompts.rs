// Prompt text for the interview workflow

pub const PERSONA_SYSTEM: &str =
    "You are a helpful assistant that generates diverse personas based on \
     user requests. Each persona should have a unique perspective and \
     background relevant to the request. \
     You MUST respond with valid JSON only, with this exact shape: \
     {\"personas\": [{\"name\": \"...\", \"background\": \"...\"}]}";

pub fn persona_prompt(k: u32, user_request: &str) -> String {
    format!(
        "Please generate {k} diverse personas for interviews related to the \
         following user request.\n\n\
         Each persona should include a name and brief background. Please \
         ensure diversity in names, gender, occupation, and technical \
         expertise.\n\n\
         User Request: {user_request}"
    )
}

pub const QUESTION_SYSTEM: &str =
    "You are an expert at generating appropriate questions based on user \
     requirements.";

pub fn question_prompt(user_request: &str, persona_name: &str, persona_background: &str) -> String {
    format!(
        "Generate one question about the user request related to the \
         following persona.\n\n\
         User Request: {user_request}\n\
         Persona: {persona_name} - {persona_background}\n\n\
         The question should be specific and designed to extract important \
         information from this persona's perspective."
    )
}

pub fn answer_system(persona_name: &str, persona_background: &str) -> String {
    format!(
        "You are responding as the following persona: \
         {persona_name} - {persona_background}"
    )
}

pub fn answer_prompt(question: &str) -> String {
    format!("Question: {question}")
}

pub const EVALUATION_SYSTEM: &str =
    "You are an expert at evaluating the sufficiency of information for \
     creating comprehensive requirements documents. \
     You MUST respond with valid JSON only, with this exact shape: \
     {\"reason\": \"...\", \"is_sufficient\": true}";

pub fn evaluation_prompt(user_request: &str, interview_digest: &str) -> String {
    format!(
        "Based on the following user request and interview results, please \
         determine whether sufficient information has been gathered to \
         create a comprehensive requirements document.\n\n\
         User Request: {user_request}\n\n\
         Interview Results:\n{interview_digest}"
    )
}

pub const REPORT_SYSTEM: &str =
    "You are an expert at creating requirements documents based on \
     collected information.";

pub fn report_prompt(user_request: &str, interview_digest: &str) -> String {
    format!(
        "Please create a requirements document based on the following user \
         request and interview results from multiple personas.\n\n\
         User Request: {user_request}\n\n\
         Interview Results:\n{interview_digest}\n\
         Please include the following sections in the requirements document:\n\
         1. Project Overview\n\
         2. Key Features\n\
         3. Non-functional Requirements\n\
         4. Constraints\n\
         5. Target Users\n\
         6. Priorities\n\
         7. Risks and Mitigation Strategies\n\n\
         Please output in English.\n\nRequirements Document:"
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_persona_prompt_includes_count_and_request() {
        let p = persona_prompt(5, "telemetry database");
        assert!(p.contains("generate 5 diverse personas"));
        assert!(p.contains("telemetry database"));
    }

    #[test]
    fn test_report_prompt_lists_all_sections() {
        let p = report_prompt("x", "y");
        for section in [
            "Project Overview",
            "Key Features",
            "Non-functional Requirements",
            "Constraints",
            "Target Users",
            "Priorities",
            "Risks and Mitigation Strategies",
        ] {
            assert!(p.contains(section), "missing section: {}", section);
        }
    }
}
