//! Configuration for the `mend` binary.
//!
//! Settings are layered:
//! 1. Default values
//! 2. Config file (`~/.mend/config.toml`, or `--config`)
//! 3. Command line flags and their environment variables

use std::path::{Path, PathBuf};

use mend::llms::OllamaConfig;
use mend::repair::RepairConfig;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

/// Error type for configuration operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    /// TOML parsing error.
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),
    /// An explicitly requested config file does not exist.
    #[error("config file not found: {}", .0.display())]
    NotFound(PathBuf),
}

/// Result type for configuration operations.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Contents of the config file.
///
/// ```toml
/// [ollama]
/// base_url = "http://localhost:11434"
/// model = "llama3.2"
///
/// [repair]
/// max_attempts = 3
/// temperature = 0.1
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MendConfig {
    /// Ollama connection settings.
    pub ollama: OllamaConfig,
    /// Repair loop settings.
    pub repair: RepairConfig,
}

/// Values given on the command line. `None` keeps the configured value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    /// Ollama base URL.
    pub base_url: Option<String>,
    /// Model identifier.
    pub model: Option<String>,
    /// Maximum generator calls.
    pub max_attempts: Option<usize>,
    /// Sampling temperature.
    pub temperature: Option<f32>,
    /// Per-call time limit in seconds.
    pub timeout_secs: Option<u64>,
}

impl MendConfig {
    /// Apply settings that only exist as environment variables.
    ///
    /// `OLLAMA_KEEP_ALIVE` has no flag, so it is read here. Blank values are
    /// ignored.
    #[must_use]
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(keep_alive) = lookup("OLLAMA_KEEP_ALIVE").filter(|v| !v.trim().is_empty()) {
            self.ollama.keep_alive = Some(keep_alive);
        }
        self
    }

    /// Apply command line overrides on top of the loaded settings.
    #[must_use]
    pub fn with_overrides(mut self, overrides: Overrides) -> Self {
        if let Some(base_url) = overrides.base_url {
            self.ollama.base_url = base_url;
        }
        if let Some(model) = overrides.model {
            self.ollama.model.clone_from(&model);
            self.repair.model = model;
        }
        if let Some(max_attempts) = overrides.max_attempts {
            self.repair.max_attempts = max_attempts;
        }
        if let Some(temperature) = overrides.temperature {
            self.repair.temperature = temperature;
        }
        if overrides.timeout_secs.is_some() {
            self.repair.timeout_secs = overrides.timeout_secs;
        }
        self
    }
}

/// Get the default config directory path.
#[must_use]
pub fn default_config_dir() -> PathBuf {
    dirs_next::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".mend")
}

/// Get the default config file path.
#[must_use]
pub fn config_path() -> PathBuf {
    default_config_dir().join("config.toml")
}

/// Load configuration.
///
/// An explicit path must exist. The default path falls back to defaults
/// when the file is absent.
pub async fn load_config(explicit: Option<&Path>) -> ConfigResult<MendConfig> {
    match explicit {
        Some(path) if !path.exists() => Err(ConfigError::NotFound(path.to_path_buf())),
        Some(path) => load_config_from(path).await,
        None => load_config_from(&config_path()).await,
    }
}

/// Load configuration from a specific path.
pub async fn load_config_from(path: &Path) -> ConfigResult<MendConfig> {
    if !path.exists() {
        info!(path = %path.display(), "config file not found, using defaults");
        return Ok(MendConfig::default());
    }

    let content = tokio::fs::read_to_string(path).await?;
    let config: MendConfig = toml::from_str(&content)?;
    debug!(path = %path.display(), "loaded config file");

    Ok(config)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use assert_fs::prelude::*;

    use super::*;

    #[test]
    fn test_default_paths() {
        assert!(default_config_dir().ends_with(".mend"));
        assert!(config_path().ends_with("config.toml"));
    }

    #[tokio::test]
    async fn test_load_partial_file() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("config.toml");
        file.write_str(
            r#"
[ollama]
model = "qwen3"

[repair]
max_attempts = 5
"#,
        )
        .unwrap();

        let config = load_config(Some(file.path())).await.unwrap();
        assert_eq!(config.ollama.model, "qwen3");
        assert_eq!(config.ollama.base_url, OllamaConfig::DEFAULT_BASE_URL);
        assert_eq!(config.repair.max_attempts, 5);
        assert_eq!(config.repair.timeout_secs, None);
    }

    #[tokio::test]
    async fn test_missing_default_file_uses_defaults() {
        let temp = assert_fs::TempDir::new().unwrap();
        let config = load_config_from(&temp.path().join("absent.toml"))
            .await
            .unwrap();
        assert_eq!(config, MendConfig::default());
    }

    #[tokio::test]
    async fn test_missing_explicit_file_is_an_error() {
        let temp = assert_fs::TempDir::new().unwrap();
        let err = load_config(Some(&temp.path().join("absent.toml")))
            .await
            .unwrap_err();
        assert!(matches!(err, ConfigError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_invalid_toml() {
        let temp = assert_fs::TempDir::new().unwrap();
        let file = temp.child("config.toml");
        file.write_str("[repair]\nmax_attempts = \"three\"\n").unwrap();

        let err = load_config(Some(file.path())).await.unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn test_keep_alive_from_env() {
        let env = |key: &str| (key == "OLLAMA_KEEP_ALIVE").then(|| "10m".to_owned());
        let config = MendConfig::default().with_env(env);
        assert_eq!(config.ollama.keep_alive.as_deref(), Some("10m"));

        let mut from_file = MendConfig::default();
        from_file.ollama.keep_alive = Some("5m".to_owned());
        let config = from_file.with_env(|_| Some("  ".to_owned()));
        assert_eq!(config.ollama.keep_alive.as_deref(), Some("5m"));
    }

    #[test]
    fn test_overrides_win() {
        let config = MendConfig::default().with_overrides(Overrides {
            base_url: Some("http://gpu:11434".to_owned()),
            model: Some("mistral".to_owned()),
            max_attempts: Some(1),
            temperature: None,
            timeout_secs: Some(30),
        });

        assert_eq!(config.ollama.base_url, "http://gpu:11434");
        assert_eq!(config.ollama.model, "mistral");
        assert_eq!(config.repair.model, "mistral");
        assert_eq!(config.repair.max_attempts, 1);
        assert_eq!(config.repair.timeout_secs, Some(30));
        assert_eq!(config.repair.temperature, RepairConfig::default().temperature);
    }
}
