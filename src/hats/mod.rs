// Six-hats deliberation: the same input, six perspectives, one synthesis
//
// All six hat calls run concurrently; the synthesis call then combines
// the labeled answers into a summary.

use std::sync::Arc;

use anyhow::{Context, Result};
use futures::future::try_join_all;

use crate::llm::{ChatModel, ChatRequest};

/// One deliberation perspective
#[derive(Debug, Clone, Copy)]
pub struct HatProfile {
    pub name: &'static str,
    pub system: &'static str,
}

pub const HATS: &[HatProfile] = &[
    HatProfile {
        name: "white",
        system: "You are a factual AI assistant. Focus only on facts, data, \
                 and objective information. Avoid opinions and emotions.",
    },
    HatProfile {
        name: "red",
        system: "You are an emotional AI assistant. Express feelings, \
                 intuitions, and gut reactions about the topic. Focus on \
                 emotional responses.",
    },
    HatProfile {
        name: "black",
        system: "You are a critical AI assistant. Focus on potential \
                 problems, risks, and weaknesses. Be cautious and highlight \
                 what could go wrong.",
    },
    HatProfile {
        name: "yellow",
        system: "You are an optimistic AI assistant. Focus on benefits, \
                 opportunities, and positive aspects. Highlight what could \
                 work well.",
    },
    HatProfile {
        name: "green",
        system: "You are a creative AI assistant. Generate new ideas, \
                 alternatives, and innovative solutions. Think outside the \
                 box.",
    },
    HatProfile {
        name: "blue",
        system: "You are a process-focused AI assistant. Think about \
                 thinking itself, organize ideas, and provide structure and \
                 control to the discussion.",
    },
];

const SYNTHESIS_SYSTEM: &str =
    "You are a result AI assistant. Combine the results of the previous AI \
     assistants. Highlight the most important information and provide a \
     summary.";

/// Per-hat answers plus the combined summary
#[derive(Debug, Clone)]
pub struct Deliberation {
    pub perspectives: Vec<(String, String)>,
    pub synthesis: String,
}

pub struct SixHats {
    model: Arc<dyn ChatModel>,
}

impl SixHats {
    pub fn new(model: Arc<dyn ChatModel>) -> Self {
        Self { model }
    }

    pub async fn run(&self, input: &str) -> Result<Deliberation> {
        let calls = HATS.iter().map(|hat| {
            let request = ChatRequest::from_prompts(hat.system, input);
            async move {
                let response = self.model.chat(&request).await?;
                Ok::<(String, String), anyhow::Error>((
                    hat.name.to_string(),
                    response.text().trim().to_string(),
                ))
            }
        });

        let perspectives = try_join_all(calls)
            .await
            .context("Hat deliberation failed")?;

        let combined = perspectives
            .iter()
            .map(|(name, text)| format!("[{} hat]\n{}", name, text))
            .collect::<Vec<_>>()
            .join("\n\n");

        let synthesis_request = ChatRequest::from_prompts(SYNTHESIS_SYSTEM, combined);
        let synthesis = self
            .model
            .chat(&synthesis_request)
            .await
            .context("Hat synthesis failed")?
            .text()
            .trim()
            .to_string();

        Ok(Deliberation {
            perspectives,
            synthesis,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockChatModel;

    #[tokio::test]
    async fn test_run_collects_all_hats_and_synthesis() {
        let model = Arc::new(MockChatModel::with_script(vec![
            "facts".to_string(),
            "feelings".to_string(),
            "risks".to_string(),
            "benefits".to_string(),
            "ideas".to_string(),
            "structure".to_string(),
            "the summary".to_string(),
        ]));
        let hats = SixHats::new(model.clone());
        let deliberation = hats.run("future of retrieval systems").await.unwrap();

        assert_eq!(deliberation.perspectives.len(), 6);
        assert_eq!(deliberation.perspectives[0].0, "white");
        assert_eq!(deliberation.perspectives[2].1, "risks");
        assert_eq!(deliberation.synthesis, "the summary");
        // 6 hats + 1 synthesis
        assert_eq!(model.call_count(), 7);
    }

    #[tokio::test]
    async fn test_synthesis_prompt_includes_labeled_sections() {
        let model = Arc::new(MockChatModel::with_reply("x"));
        let hats = SixHats::new(model.clone());
        hats.run("topic").await.unwrap();

        let sent = model.requests();
        let synthesis_input = &sent.last().unwrap().messages[1].content;
        for hat in HATS {
            assert!(synthesis_input.contains(&format!("[{} hat]", hat.name)));
        }
    }
}
