//! Error types for the glyph conversion pipeline.
//!
//! Two layers: fatal errors that abort a run (configuration, directory
//! access) and per-file errors that are caught at the file boundary,
//! recorded in the run log, and never abort the batch.

use std::path::PathBuf;
use thiserror::Error;

/// Top-level error type for glyph operations.
#[derive(Error, Debug)]
pub enum GlyphError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Per-file conversion errors
    #[error("Conversion error: {0}")]
    Convert(#[from] ConvertError),

    /// General I/O errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read the config file from disk
    #[error("Failed to read config file: {0}")]
    Read(#[from] std::io::Error),

    /// Failed to parse TOML configuration
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration values are invalid
    #[error("Invalid configuration: {0}")]
    Validation(String),

    /// Model id not present in the catalog
    #[error("Unknown model '{id}'. Known models: {known}")]
    UnknownModel { id: String, known: String },
}

/// Per-file conversion errors, organized by failure site.
///
/// Unsupported file types never appear here — discovery filters them out
/// silently before the batch loop starts.
#[derive(Error, Debug)]
pub enum ConvertError {
    /// Source image could not be read
    #[error("Failed to read {path}: {message}")]
    Read { path: PathBuf, message: String },

    /// Provider rejected the credential (HTTP 401/403)
    #[error("{provider} rejected credentials: {message}")]
    Auth { provider: String, message: String },

    /// Network-level failure before a response arrived
    #[error("{provider} request failed: {message}")]
    Transport { provider: String, message: String },

    /// Provider returned a non-2xx status or a malformed/empty body.
    /// `status` is kept separately for classification; display relies on
    /// the message carrying the HTTP detail.
    #[error("{provider} API error: {message}")]
    Api {
        provider: String,
        status: Option<u16>,
        message: String,
    },

    /// Request exceeded the configured per-file time budget
    #[error("Timeout for {path} after {timeout_ms}ms")]
    Timeout { path: PathBuf, timeout_ms: u64 },

    /// File exceeds the configured size limit
    #[error("File too large: {path} ({size_mb}MB > {max_mb}MB)")]
    FileTooLarge {
        path: PathBuf,
        size_mb: u64,
        max_mb: u64,
    },

    /// Markdown output could not be persisted
    #[error("Failed to write {path}: {message}")]
    Write { path: PathBuf, message: String },
}

/// Convenience type alias for glyph results.
pub type Result<T> = std::result::Result<T, GlyphError>;

/// Convenience type alias for per-file conversion results.
pub type ConvertResult<T> = std::result::Result<T, ConvertError>;
