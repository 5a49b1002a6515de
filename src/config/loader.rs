// Configuration loading
//
// Reads ~/.parley/config.toml when present, otherwise returns defaults.
// A missing file is not an error; a malformed one is.

use anyhow::{Context, Result};
use std::path::Path;

use super::settings::{config_dir, Config};

/// Load configuration from the default location
pub fn load_config() -> Result<Config> {
    let path = match config_dir() {
        Some(dir) => dir.join("config.toml"),
        None => {
            tracing::warn!("No home directory; using default configuration");
            return Ok(Config::default());
        }
    };

    load_config_from(&path)
}

/// Load configuration from an explicit path (missing file = defaults)
pub fn load_config_from(path: &Path) -> Result<Config> {
    if !path.exists() {
        tracing::debug!("No config file at {:?}; using defaults", path);
        return Ok(Config::default());
    }

    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {:?}", path))?;

    let config: Config = toml::from_str(&raw)
        .with_context(|| format!("Failed to parse config file {:?}", path))?;

    config.validate()?;

    tracing::debug!("Loaded configuration from {:?}", path);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_missing_file_returns_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config.ollama.chat_model, "llama3.1:latest");
    }

    #[test]
    fn test_file_overrides_are_applied() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "[ollama]\nchat_model = \"mistral:7b\"\ntemperature = 0.7").unwrap();

        let config = load_config_from(&path).unwrap();
        assert_eq!(config.ollama.chat_model, "mistral:7b");
        assert_eq!(config.ollama.temperature, 0.7);
        // Untouched sections keep defaults
        assert_eq!(config.workflow.personas_per_round, 5);
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "not [valid toml").unwrap();
        assert!(load_config_from(&path).is_err());
    }

    #[test]
    fn test_invalid_values_rejected_at_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[workflow]\nmax_iterations = 0").unwrap();
        assert!(load_config_from(&path).is_err());
    }
}
