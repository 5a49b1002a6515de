// Configuration structs

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Connection settings for the local Ollama server
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig {
    /// Server base URL
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Chat model name
    #[serde(default = "default_chat_model")]
    pub chat_model: String,

    /// Embedding model name
    #[serde(default = "default_embed_model")]
    pub embed_model: String,

    /// Sampling temperature applied when a request does not set one
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// HTTP request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://localhost:11434".to_string()
}

fn default_chat_model() -> String {
    "llama3.1:latest".to_string()
}

fn default_embed_model() -> String {
    "nomic-embed-text".to_string()
}

fn default_temperature() -> f32 {
    0.2
}

fn default_timeout() -> u64 {
    120
}

impl Default for OllamaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat_model: default_chat_model(),
            embed_model: default_embed_model(),
            temperature: default_temperature(),
            timeout_seconds: default_timeout(),
        }
    }
}

/// Bounds for the iterative workflows
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Maximum persona-generation rounds in the interview workflow
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,

    /// Personas generated per round
    #[serde(default = "default_personas_per_round")]
    pub personas_per_round: u32,

    /// Only the most recent N personas are interviewed each round
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,

    /// Maximum role retries in the role-routed Q&A loop
    #[serde(default = "default_max_role_retries")]
    pub max_role_retries: u32,
}

fn default_max_iterations() -> u32 {
    5
}

fn default_personas_per_round() -> u32 {
    5
}

fn default_recent_window() -> usize {
    5
}

fn default_max_role_retries() -> u32 {
    3
}

impl Default for WorkflowConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
            personas_per_round: default_personas_per_round(),
            recent_window: default_recent_window(),
            max_role_retries: default_max_role_retries(),
        }
    }
}

/// Feature flags configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturesConfig {
    /// Stream final documents instead of printing them whole
    #[serde(default = "default_true")]
    pub streaming_enabled: bool,

    /// Record every model call to the JSONL transcript
    #[serde(default)]
    pub transcript_enabled: bool,
}

fn default_true() -> bool {
    true
}

impl Default for FeaturesConfig {
    fn default() -> Self {
        Self {
            streaming_enabled: true,   // Better terminal UX by default
            transcript_enabled: false, // Writes files; opt in
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub ollama: OllamaConfig,

    #[serde(default)]
    pub workflow: WorkflowConfig,

    #[serde(default)]
    pub features: FeaturesConfig,
}

impl Config {
    /// Validate configuration and return helpful errors
    pub fn validate(&self) -> anyhow::Result<()> {
        if !self.ollama.base_url.starts_with("http://")
            && !self.ollama.base_url.starts_with("https://")
        {
            anyhow::bail!(
                "Invalid Ollama base URL: '{}'\n\n\
                 The URL must include a scheme, e.g.:\n  \
                 http://localhost:11434",
                self.ollama.base_url
            );
        }

        if self.ollama.chat_model.trim().is_empty() {
            anyhow::bail!(
                "No chat model configured\n\n\
                 Set ollama.chat_model in {} (e.g. \"llama3.1:latest\")",
                config_path_display()
            );
        }

        if !(0.0..=2.0).contains(&self.ollama.temperature) {
            anyhow::bail!(
                "temperature ({}) is out of range\n\n\
                 Valid range: 0.0 - 2.0",
                self.ollama.temperature
            );
        }

        if self.ollama.timeout_seconds == 0 {
            anyhow::bail!("timeout_seconds must be greater than 0");
        }

        if self.ollama.timeout_seconds > 3600 {
            anyhow::bail!(
                "timeout_seconds ({}) is very high\n\n\
                 Recommended range: 30-600 seconds",
                self.ollama.timeout_seconds
            );
        }

        if self.workflow.max_iterations == 0 {
            anyhow::bail!("workflow.max_iterations must be greater than 0");
        }

        if self.workflow.personas_per_round == 0 {
            anyhow::bail!("workflow.personas_per_round must be greater than 0");
        }

        if self.workflow.max_role_retries == 0 {
            anyhow::bail!("workflow.max_role_retries must be greater than 0");
        }

        Ok(())
    }

    /// Path of the on-disk transcript (under the config directory)
    pub fn transcript_path(&self) -> Option<PathBuf> {
        config_dir().map(|d| d.join("transcript.jsonl"))
    }

    /// Save configuration to `~/.parley/config.toml`
    pub fn save(&self) -> anyhow::Result<()> {
        use std::fs;

        let config_dir = config_dir()
            .ok_or_else(|| anyhow::anyhow!("Could not determine home directory"))?;
        let config_path = config_dir.join("config.toml");

        fs::create_dir_all(&config_dir)?;

        let toml_string = toml::to_string_pretty(self)?;
        fs::write(&config_path, toml_string)?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }
}

/// `~/.parley`, or `None` when the home directory cannot be determined
pub fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".parley"))
}

fn config_path_display() -> String {
    config_dir()
        .map(|d| d.join("config.toml").display().to_string())
        .unwrap_or_else(|| "~/.parley/config.toml".to_string())
}
