//! Configuration management for glyph.
//!
//! Configuration is loaded from the platform config directory with sensible
//! defaults. The model catalog lives in the config file so new provider
//! releases can be added without a rebuild.

mod types;
mod validate;

pub use types::*;

use crate::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Root configuration structure for glyph.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Model id used when no `--model` flag is given
    pub default_model: String,

    /// Known vision-capable models, selectable by id
    pub models: Vec<ModelEntry>,

    /// Processing settings
    pub processing: ProcessingConfig,

    /// Resource limits
    pub limits: LimitsConfig,

    /// Prompt settings
    pub prompt: PromptConfig,

    /// Output settings
    pub output: OutputConfig,

    /// Logging settings
    pub logging: LoggingConfig,

    /// LLM provider settings
    pub llm: LlmConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_model: "claude-sonnet-4-20250514".to_string(),
            models: ModelEntry::builtin_catalog(),
            processing: ProcessingConfig::default(),
            limits: LimitsConfig::default(),
            prompt: PromptConfig::default(),
            output: OutputConfig::default(),
            logging: LoggingConfig::default(),
            llm: LlmConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from the default location.
    ///
    /// Returns default configuration if the file doesn't exist.
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::default_path();
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file path.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default config file path.
    ///
    /// Uses platform-appropriate directories:
    /// - macOS: ~/Library/Application Support/com.glyph.glyph/config.toml
    /// - Linux: ~/.config/glyph/config.toml
    /// - Windows: C:\Users\<User>\AppData\Roaming\glyph\config\config.toml
    ///
    /// Falls back to ~/.glyph/config.toml if directory detection fails.
    pub fn default_path() -> PathBuf {
        directories::ProjectDirs::from("com", "glyph", "glyph")
            .map(|dirs| dirs.config_dir().to_path_buf().join("config.toml"))
            .unwrap_or_else(|| {
                let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
                PathBuf::from(home).join(".glyph").join("config.toml")
            })
    }

    /// Resolve a model id against the catalog.
    ///
    /// `None` selects the configured default model.
    pub fn resolve_model(&self, id: Option<&str>) -> Result<&ModelEntry, ConfigError> {
        let id = id.unwrap_or(&self.default_model);
        self.models
            .iter()
            .find(|m| m.id == id)
            .ok_or_else(|| ConfigError::UnknownModel {
                id: id.to_string(),
                known: self
                    .models
                    .iter()
                    .map(|m| m.id.as_str())
                    .collect::<Vec<_>>()
                    .join(", "),
            })
    }

    /// Load the system prompt: the configured override file if set,
    /// otherwise the built-in default.
    pub fn system_prompt(&self) -> Result<String, ConfigError> {
        match &self.prompt.system_file {
            Some(path) => {
                let expanded = shellexpand::tilde(path);
                let text = std::fs::read_to_string(expanded.as_ref())?;
                if text.trim().is_empty() {
                    return Err(ConfigError::Validation(format!(
                        "prompt.system_file {path} is empty"
                    )));
                }
                Ok(text)
            }
            None => Ok(crate::prompt::DEFAULT_SYSTEM_PROMPT.to_string()),
        }
    }

    /// Resolved output directory override (with ~ expansion), if configured.
    pub fn output_dir(&self) -> Option<PathBuf> {
        self.output
            .dir
            .as_ref()
            .map(|d| PathBuf::from(shellexpand::tilde(d).into_owned()))
    }

    /// Serialize the config to a pretty TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Validation(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.limits.request_timeout_ms, 60_000);
        assert_eq!(config.prompt.max_tokens, 4096);
        assert!(!config.models.is_empty());
    }

    #[test]
    fn test_config_to_toml() {
        let config = Config::default();
        let toml = config.to_toml().unwrap();
        assert!(toml.contains("[processing]"));
        assert!(toml.contains("[[models]]"));
    }

    #[test]
    fn test_default_model_is_in_catalog() {
        let config = Config::default();
        assert!(config.resolve_model(None).is_ok());
    }

    #[test]
    fn test_resolve_model_by_id() {
        let config = Config::default();
        let entry = config.resolve_model(Some("pixtral-large-latest")).unwrap();
        assert_eq!(entry.provider, ProviderKind::Mistral);
    }

    #[test]
    fn test_resolve_unknown_model() {
        let config = Config::default();
        let err = config.resolve_model(Some("no-such-model")).unwrap_err();
        assert!(err.to_string().contains("no-such-model"));
    }

    #[test]
    fn test_load_from_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, Config::default().to_toml().unwrap()).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.default_model, Config::default().default_model);
        assert_eq!(loaded.models.len(), Config::default().models.len());
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "default_model = \"gemini-3-flash-preview\"\n").unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.default_model, "gemini-3-flash-preview");
        // Unspecified sections fall back to defaults
        assert_eq!(loaded.limits.request_timeout_ms, 60_000);
        assert!(!loaded.models.is_empty());
    }

    #[test]
    fn test_system_prompt_default() {
        let config = Config::default();
        let prompt = config.system_prompt().unwrap();
        assert!(prompt.contains("markdown"));
    }

    #[test]
    fn test_system_prompt_override() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.txt");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "Transcribe everything verbatim.").unwrap();

        let mut config = Config::default();
        config.prompt.system_file = Some(path.to_string_lossy().into_owned());
        let prompt = config.system_prompt().unwrap();
        assert!(prompt.contains("verbatim"));
    }
}
