//! Sub-configuration structs with defaults.

use serde::{Deserialize, Serialize};

/// Provider backing a catalog model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    Anthropic,
    Gemini,
    Mistral,
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderKind::Anthropic => write!(f, "anthropic"),
            ProviderKind::Gemini => write!(f, "gemini"),
            ProviderKind::Mistral => write!(f, "mistral"),
        }
    }
}

/// One selectable entry in the model catalog.
///
/// The catalog lives in the config file so newly released models can be
/// added without a rebuild.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelEntry {
    /// Model identifier sent to the provider API
    pub id: String,

    /// Which provider serves this model
    pub provider: ProviderKind,

    /// Short human-readable description shown in listings
    #[serde(default)]
    pub description: String,
}

impl ModelEntry {
    fn new(id: &str, provider: ProviderKind, description: &str) -> Self {
        Self {
            id: id.to_string(),
            provider,
            description: description.to_string(),
        }
    }

    /// Built-in catalog used when the config file supplies none.
    pub fn builtin_catalog() -> Vec<ModelEntry> {
        vec![
            ModelEntry::new(
                "claude-sonnet-4-20250514",
                ProviderKind::Anthropic,
                "Claude Sonnet (recommended)",
            ),
            ModelEntry::new(
                "claude-3-5-haiku-20241022",
                ProviderKind::Anthropic,
                "Claude Haiku (fastest)",
            ),
            ModelEntry::new(
                "gemini-3-flash-preview",
                ProviderKind::Gemini,
                "Gemini Flash",
            ),
            ModelEntry::new("gemini-3-pro-preview", ProviderKind::Gemini, "Gemini Pro"),
            ModelEntry::new("pixtral-12b-2409", ProviderKind::Mistral, "Pixtral 12B"),
            ModelEntry::new(
                "pixtral-large-latest",
                ProviderKind::Mistral,
                "Pixtral Large",
            ),
        ]
    }
}

/// Processing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProcessingConfig {
    /// Supported input extensions (matched case-insensitively)
    pub supported_formats: Vec<String>,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            supported_formats: vec![
                "jpg".to_string(),
                "jpeg".to_string(),
                "png".to_string(),
                "gif".to_string(),
                "webp".to_string(),
            ],
        }
    }
}

/// Resource limits to protect against problematic inputs.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LimitsConfig {
    /// Per-request timeout in milliseconds
    pub request_timeout_ms: u64,

    /// Maximum source image size in megabytes
    pub max_file_size_mb: u64,
}

impl Default for LimitsConfig {
    fn default() -> Self {
        Self {
            request_timeout_ms: 60_000,
            max_file_size_mb: 20,
        }
    }
}

/// Prompt settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PromptConfig {
    /// Maximum tokens the model may generate per image
    pub max_tokens: u32,

    /// Sampling temperature (0.0 keeps transcription deterministic)
    pub temperature: f32,

    /// Optional path to a file overriding the built-in system prompt
    pub system_file: Option<String>,
}

impl Default for PromptConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.0,
            system_file: None,
        }
    }
}

/// Output settings.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Directory for generated Markdown files.
    /// When unset, each `.md` lands next to its source image.
    pub dir: Option<String>,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,

    /// Log format: "pretty" or "json"
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

/// LLM provider configurations.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct LlmConfig {
    /// Anthropic configuration
    pub anthropic: Option<AnthropicConfig>,

    /// Gemini configuration
    pub gemini: Option<GeminiConfig>,

    /// Mistral configuration
    pub mistral: Option<MistralConfig>,
}

/// Anthropic configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnthropicConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,
}

impl Default for AnthropicConfig {
    fn default() -> Self {
        Self {
            api_key: "${ANTHROPIC_API_KEY}".to_string(),
        }
    }
}

/// Gemini configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig {
    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: "${GEMINI_API_KEY}".to_string(),
        }
    }
}

/// Mistral configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MistralConfig {
    /// API endpoint
    pub endpoint: String,

    /// API key (supports ${ENV_VAR} syntax)
    pub api_key: String,
}

impl Default for MistralConfig {
    fn default() -> Self {
        Self {
            endpoint: "https://api.mistral.ai".to_string(),
            api_key: "${MISTRAL_API_KEY}".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_covers_all_providers() {
        let catalog = ModelEntry::builtin_catalog();
        for kind in [
            ProviderKind::Anthropic,
            ProviderKind::Gemini,
            ProviderKind::Mistral,
        ] {
            assert!(
                catalog.iter().any(|m| m.provider == kind),
                "no {kind} entry in builtin catalog"
            );
        }
    }

    #[test]
    fn provider_kind_roundtrips_through_toml() {
        let entry = ModelEntry::new("m", ProviderKind::Gemini, "d");
        let toml = toml::to_string(&entry).unwrap();
        assert!(toml.contains("provider = \"gemini\""));
        let back: ModelEntry = toml::from_str(&toml).unwrap();
        assert_eq!(back.provider, ProviderKind::Gemini);
    }

    #[test]
    fn supported_formats_default_allow_list() {
        let config = ProcessingConfig::default();
        for ext in ["jpg", "jpeg", "png", "gif", "webp"] {
            assert!(config.supported_formats.iter().any(|f| f == ext));
        }
    }
}
