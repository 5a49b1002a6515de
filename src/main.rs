// parley - multi-agent prompt workflows over a local Ollama model
// Main entry point

use anyhow::Result;
use clap::Parser;

use parley::cli::{run, Cli};
use parley::config::load_config;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    // Load configuration
    let config = load_config()?;

    run(cli, config).await
}
