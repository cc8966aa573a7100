//! Vision provider trait and request/response types.
//!
//! Defines the interface that all providers implement, plus the factory
//! that creates the right provider from a catalog entry and config.

use crate::config::{LlmConfig, ModelEntry, ProviderKind};
use crate::error::{ConfigError, ConvertError};
use async_trait::async_trait;
use base64::Engine;
use std::time::Duration;

/// Base64-encoded image ready to send to a provider API.
#[derive(Debug, Clone)]
pub struct ImageInput {
    /// Base64-encoded image bytes
    pub data: String,
    /// MIME type (e.g., "image/jpeg", "image/png")
    pub media_type: String,
}

impl ImageInput {
    /// Create an `ImageInput` from raw bytes and the source file extension.
    pub fn from_bytes(bytes: &[u8], extension: &str) -> Self {
        let media_type = match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => "image/jpeg",
            "png" => "image/png",
            "gif" => "image/gif",
            "webp" => "image/webp",
            other => {
                tracing::warn!("Unknown image extension '{other}', defaulting to image/jpeg");
                "image/jpeg"
            }
        };

        Self {
            data: base64::engine::general_purpose::STANDARD.encode(bytes),
            media_type: media_type.to_string(),
        }
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type, self.data)
    }
}

/// A request to convert one image to Markdown.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    /// The image to convert
    pub image: ImageInput,
    /// System instructions defining the Markdown conventions
    pub system: String,
    /// User-turn instruction accompanying the image
    pub user: String,
    /// Maximum tokens to generate
    pub max_tokens: u32,
    /// Sampling temperature
    pub temperature: f32,
}

/// The response from a provider call.
#[derive(Debug, Clone)]
pub struct VisionResponse {
    /// Generated Markdown text
    pub text: String,
    /// Model identifier as reported by the provider
    pub model: String,
    /// Number of tokens used (input + output), if reported
    pub tokens_used: Option<u32>,
    /// Round-trip latency in milliseconds
    pub latency_ms: u64,
}

/// Trait that all vision providers implement.
///
/// Uses `async_trait` because native async fn in trait is not object-safe
/// (we need `Box<dyn VisionProvider>` for dynamic dispatch).
#[async_trait]
pub trait VisionProvider: Send + Sync {
    /// Provider name for logging and error messages (e.g., "anthropic").
    fn name(&self) -> &str;

    /// Send one image plus instructions, await the text completion.
    async fn generate(&self, request: &VisionRequest) -> Result<VisionResponse, ConvertError>;

    /// Per-request timeout for this provider.
    fn timeout(&self) -> Duration;
}

/// Resolve `${ENV_VAR}` references in config strings.
pub fn resolve_env_var(value: &str) -> Option<String> {
    if value.starts_with("${") && value.ends_with('}') {
        let var_name = &value[2..value.len() - 1];
        std::env::var(var_name).ok()
    } else if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Classify a non-2xx provider response: credential rejections get their
/// own variant, everything else is an API error carrying the status.
pub(crate) fn status_error(provider: &str, status: u16, body: String) -> ConvertError {
    if status == 401 || status == 403 {
        ConvertError::Auth {
            provider: provider.to_string(),
            message: format!("HTTP {status}: {body}"),
        }
    } else {
        ConvertError::Api {
            provider: provider.to_string(),
            status: Some(status),
            message: format!("HTTP {status}: {body}"),
        }
    }
}

/// Factory that creates the appropriate provider for a catalog entry.
pub struct ProviderFactory;

impl ProviderFactory {
    /// Create a provider for the given model entry.
    ///
    /// API keys come from the per-provider config sections, with `${ENV_VAR}`
    /// references resolved here. A missing key is a fatal configuration
    /// error, surfaced before any file is attempted.
    pub fn create(
        entry: &ModelEntry,
        config: &LlmConfig,
        timeout: Duration,
    ) -> Result<Box<dyn VisionProvider>, ConfigError> {
        match entry.provider {
            ProviderKind::Anthropic => {
                let cfg = config.anthropic.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    ConfigError::Validation(
                        "Anthropic API key not set. Set ANTHROPIC_API_KEY env var.".to_string(),
                    )
                })?;
                Ok(Box::new(super::anthropic::AnthropicProvider::new(
                    &api_key, &entry.id, timeout,
                )))
            }
            ProviderKind::Gemini => {
                let cfg = config.gemini.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    ConfigError::Validation(
                        "Gemini API key not set. Set GEMINI_API_KEY env var.".to_string(),
                    )
                })?;
                Ok(Box::new(super::gemini::GeminiProvider::new(
                    &api_key, &entry.id, timeout,
                )))
            }
            ProviderKind::Mistral => {
                let cfg = config.mistral.clone().unwrap_or_default();
                let api_key = resolve_env_var(&cfg.api_key).ok_or_else(|| {
                    ConfigError::Validation(
                        "Mistral API key not set. Set MISTRAL_API_KEY env var.".to_string(),
                    )
                })?;
                Ok(Box::new(super::mistral::MistralProvider::new(
                    &cfg.endpoint,
                    &api_key,
                    &entry.id,
                    timeout,
                )))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_input_from_bytes_jpeg() {
        let input = ImageInput::from_bytes(&[0xFF, 0xD8, 0xFF], "jpg");
        assert_eq!(input.media_type, "image/jpeg");
        assert!(!input.data.is_empty());
    }

    #[test]
    fn test_image_input_uppercase_extension() {
        let input = ImageInput::from_bytes(&[0x89, 0x50, 0x4E, 0x47], "PNG");
        assert_eq!(input.media_type, "image/png");
    }

    #[test]
    fn test_image_input_unknown_extension_defaults_jpeg() {
        let input = ImageInput::from_bytes(&[1, 2, 3], "tiff");
        assert_eq!(input.media_type, "image/jpeg");
    }

    #[test]
    fn test_image_input_data_url() {
        let input = ImageInput::from_bytes(&[1, 2, 3], "webp");
        assert!(input.data_url().starts_with("data:image/webp;base64,"));
    }

    #[test]
    fn test_resolve_env_var() {
        // Non-env-var strings pass through
        assert_eq!(resolve_env_var("plain-key"), Some("plain-key".to_string()));
        // Empty returns None
        assert_eq!(resolve_env_var(""), None);
        // Unset env var returns None
        assert_eq!(resolve_env_var("${DEFINITELY_NOT_SET_XYZ_123}"), None);
    }

    #[test]
    fn test_status_error_classifies_auth() {
        let err = status_error("anthropic", 401, "invalid x-api-key".to_string());
        assert!(matches!(err, ConvertError::Auth { .. }));

        let err = status_error("mistral", 403, "forbidden".to_string());
        assert!(matches!(err, ConvertError::Auth { .. }));
    }

    #[test]
    fn test_status_error_other_statuses_are_api_errors() {
        let err = status_error("gemini", 429, "quota".to_string());
        match err {
            ConvertError::Api { status, .. } => assert_eq!(status, Some(429)),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[test]
    fn test_factory_missing_key_is_config_error() {
        let entry = ModelEntry {
            id: "claude-sonnet-4-20250514".to_string(),
            provider: ProviderKind::Anthropic,
            description: String::new(),
        };
        let mut config = LlmConfig::default();
        config.anthropic = Some(crate::config::AnthropicConfig {
            api_key: "${GLYPH_TEST_UNSET_KEY_XYZ}".to_string(),
        });
        let err = match ProviderFactory::create(&entry, &config, Duration::from_secs(60)) {
            Ok(_) => panic!("expected config error"),
            Err(e) => e,
        };
        assert!(err.to_string().contains("ANTHROPIC_API_KEY"));
    }
}
