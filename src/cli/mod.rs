// Command-line interface
//
// Each subcommand exercises one workflow and prints (or streams) the
// result to stdout.

use std::io::Write as _;
use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::sync::mpsc;

use crate::chain::{Chain, ChainStep};
use crate::config::Config;
use crate::goals;
use crate::hats::SixHats;
use crate::interview::InterviewAgent;
use crate::llm::{ChatModel, OllamaClient, StreamChunk};
use crate::retrieval::RetrievalQa;
use crate::roleplay::RoleAgent;
use crate::transcript::{RecordingModel, TranscriptLogger};

#[derive(Parser)]
#[command(
    name = "parley",
    version,
    about = "Multi-agent prompt workflows over a local Ollama model"
)]
pub struct Cli {
    /// Override the configured chat model
    #[arg(long, global = true)]
    pub model: Option<String>,

    /// Override the configured Ollama base URL
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Elicit requirements through simulated persona interviews
    Interview {
        /// What should be built
        request: String,

        /// Stream the report instead of running the full evaluation loop
        #[arg(long)]
        stream: bool,

        /// Personas generated per round
        #[arg(long)]
        personas: Option<u32>,
    },

    /// Answer a question in the voice of an auto-selected role
    Ask {
        query: String,

        /// Print the step transcript as well
        #[arg(short, long)]
        verbose: bool,
    },

    /// Deliberate on a topic with the six thinking hats
    Hats { input: String },

    /// Refine a task into a SMART goal with measurement criteria
    Optimize { task: String },

    /// Generate a recipe, then extract its ingredient list
    Recipe {
        dish: String,

        /// Stream the final stage
        #[arg(long)]
        stream: bool,
    },

    /// Answer a question grounded in the given document files
    Docqa {
        question: String,

        /// Text files to index (one document per file)
        #[arg(long = "doc", required = true)]
        docs: Vec<PathBuf>,
    },

    /// Print the resolved configuration
    Config,
}

pub async fn run(cli: Cli, mut config: Config) -> Result<()> {
    if let Some(model) = cli.model {
        config.ollama.chat_model = model;
    }
    if let Some(base_url) = cli.base_url {
        config.ollama.base_url = base_url;
    }
    config.validate()?;

    match cli.command {
        Command::Interview {
            request,
            stream,
            personas,
        } => {
            if let Some(k) = personas {
                config.workflow.personas_per_round = k;
            }
            let model = build_model(&config, "interview")?;
            let agent = InterviewAgent::new(model, &config.workflow)?;

            if stream {
                let rx = agent.stream_report(&request).await?;
                print_stream(rx).await?;
            } else {
                let state = agent.run(&request).await?;
                println!("{}", state.report);
                println!();
                println!(
                    "({} personas, {} interviews, {} round{})",
                    state.personas.len(),
                    state.interviews.len(),
                    state.iteration,
                    if state.iteration == 1 { "" } else { "s" }
                );
            }
        }

        Command::Ask { query, verbose } => {
            let model = build_model(&config, "ask")?;
            let agent = RoleAgent::new(model, &config.workflow)?;
            let outcome = agent.run(&query).await?;

            if verbose {
                for line in &outcome.transcript {
                    println!("  {}", line);
                }
                println!();
            }
            println!("{}", outcome.answer);
            println!();
            println!(
                "(role: {}, approved: {}, attempts: {})",
                outcome.role, outcome.approved, outcome.attempts
            );
        }

        Command::Hats { input } => {
            let model = build_model(&config, "hats")?;
            let deliberation = SixHats::new(model).run(&input).await?;

            for (name, text) in &deliberation.perspectives {
                println!("=== {} hat ===", name);
                println!("{}", text);
                println!();
            }
            println!("=== synthesis ===");
            println!("{}", deliberation.synthesis);
        }

        Command::Optimize { task } => {
            let model = build_model(&config, "optimize")?;
            let optimized = goals::refine(model, &task).await?;
            println!("{}", optimized.text());
        }

        Command::Recipe { dish, stream } => {
            let model = build_model(&config, "recipe")?;
            let chain = Chain::new(model)
                .then(ChainStep::new(
                    "Think of a recipe for the dish the user names.",
                    "{input}",
                ))
                .then(ChainStep::new(
                    "List only the ingredients for the recipe below.",
                    "{input}",
                ))
                .map(|s| s.to_uppercase());

            if stream {
                let rx = chain.stream(&dish).await?;
                print_stream(rx).await?;
            } else {
                println!("{}", chain.run(&dish).await?);
            }
        }

        Command::Docqa { question, docs } => {
            let client = Arc::new(OllamaClient::new(&config.ollama)?);
            let mut qa = RetrievalQa::new(client.clone(), client);

            let mut texts = Vec::new();
            for path in &docs {
                let text = std::fs::read_to_string(path)
                    .with_context(|| format!("Failed to read document {:?}", path))?;
                texts.push(text);
            }
            qa.add_documents(&texts).await?;
            tracing::info!(documents = qa.document_count(), "Indexed documents");

            println!("{}", qa.ask(&question).await?);
        }

        Command::Config => {
            println!("{}", toml::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

/// Build the chat model, recording calls when the transcript is enabled
fn build_model(config: &Config, label: &str) -> Result<Arc<dyn ChatModel>> {
    let client = Arc::new(OllamaClient::new(&config.ollama)?);

    if config.features.transcript_enabled {
        if let Some(path) = config.transcript_path() {
            let logger = TranscriptLogger::new(path)?;
            return Ok(Arc::new(RecordingModel::new(client, logger, label)));
        }
    }
    Ok(client)
}

/// Print text deltas as they arrive, ending with a newline
async fn print_stream(mut rx: mpsc::Receiver<Result<StreamChunk>>) -> Result<()> {
    let mut stdout = std::io::stdout();
    while let Some(chunk) = rx.recv().await {
        if let StreamChunk::TextDelta(delta) = chunk? {
            print!("{}", delta);
            stdout.flush().ok();
        }
    }
    println!();
    Ok(())
}
