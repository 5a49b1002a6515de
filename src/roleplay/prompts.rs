// Prompt text for the role-routed Q&A loop

pub const SELECT_SYSTEM: &str =
    "You route user questions to the best-suited answering role.";

pub fn select_prompt(query: &str, catalog: &str) -> String {
    format!(
        "Choose the most suitable role for the question below.\n\n\
         Question: {query}\n\n\
         Options:\n{catalog}\n\n\
         Answer with the role name only."
    )
}

pub fn answer_prompt(query: &str) -> String {
    format!("Question: {query}\n\nPlease answer.")
}

pub const JUDGE_SYSTEM: &str =
    "You evaluate whether an answer adequately addresses a question. \
     You MUST respond with valid JSON only, with this exact shape: \
     {\"approved\": true, \"reason\": \"...\"}";

pub fn judge_prompt(query: &str, role: &str, answer: &str) -> String {
    format!(
        "Evaluate the following question and answer.\n\n\
         Question: {query}\n\
         Role: {role}\n\
         Answer: {answer}\n\n\
         Does this answer adequately address the question? Give your \
         judgment and the reason for it."
    )
}
