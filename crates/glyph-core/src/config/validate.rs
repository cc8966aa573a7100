//! Configuration validation with range checks.

use crate::error::ConfigError;

use super::Config;

impl Config {
    /// Validate configuration values are within acceptable ranges.
    pub(crate) fn validate(&self) -> Result<(), ConfigError> {
        if self.models.is_empty() {
            return Err(ConfigError::Validation(
                "models catalog must not be empty".into(),
            ));
        }
        if !self.models.iter().any(|m| m.id == self.default_model) {
            return Err(ConfigError::Validation(format!(
                "default_model '{}' is not in the models catalog",
                self.default_model
            )));
        }
        if self.processing.supported_formats.is_empty() {
            return Err(ConfigError::Validation(
                "processing.supported_formats must not be empty".into(),
            ));
        }
        if self.limits.request_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "limits.request_timeout_ms must be > 0".into(),
            ));
        }
        if self.limits.max_file_size_mb == 0 {
            return Err(ConfigError::Validation(
                "limits.max_file_size_mb must be > 0".into(),
            ));
        }
        if self.prompt.max_tokens == 0 {
            return Err(ConfigError::Validation(
                "prompt.max_tokens must be > 0".into(),
            ));
        }
        if !(0.0..=2.0).contains(&self.prompt.temperature) {
            return Err(ConfigError::Validation(
                "prompt.temperature must be between 0.0 and 2.0".into(),
            ));
        }
        Ok(())
    }
}
