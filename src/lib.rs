// parley - multi-agent prompt workflows over a local Ollama model
// Library exports

pub mod chain;
pub mod cli;
pub mod config;
pub mod goals;
pub mod hats;
pub mod interview;
pub mod llm;
pub mod retrieval;
pub mod roleplay;
pub mod transcript;
pub mod workflow;
