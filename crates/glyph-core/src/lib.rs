//! glyph-core - Embeddable image-to-Markdown conversion library.
//!
//! glyph sends images of structured content (tables, charts, formulas,
//! diagrams) to a hosted vision-language model and persists the returned
//! Markdown next to each source image. The model does the reading; this
//! library does the plumbing.
//!
//! # Architecture
//!
//! ```text
//! Directory → Discover → Encode (base64) → Provider request → <name>.md + run log
//! ```
//!
//! Processing is strictly sequential: one file, one request in flight,
//! exactly one attempt per file per run.
//!
//! # Usage
//!
//! ```rust,ignore
//! use glyph_core::{convert_files, Config, ConvertOptions, FileDiscovery, ProviderFactory, RunLog};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> glyph_core::Result<()> {
//!     let config = Config::load()?;
//!     let model = config.resolve_model(None)?;
//!     let provider = ProviderFactory::create(model, &config.llm, Duration::from_secs(60))?;
//!     let options = ConvertOptions::from_config(&config)?;
//!
//!     let files = FileDiscovery::new(config.processing.clone()).discover("./scans".as_ref());
//!     let mut log = RunLog::create("./scans".as_ref())?;
//!     let summary = convert_files(&files, provider.as_ref(), &options, &mut log, |_, _| {}).await;
//!     println!("{} of {} converted", summary.succeeded, summary.discovered);
//!     Ok(())
//! }
//! ```

// Module declarations
pub mod config;
pub mod convert;
pub mod discovery;
pub mod error;
pub mod llm;
pub mod prompt;
pub mod runlog;

// Re-exports for convenient access
pub use config::{Config, ModelEntry, ProviderKind};
pub use convert::{convert_files, output_path, ConvertOptions, FileOutcome, RunSummary};
pub use discovery::{DiscoveredFile, FileDiscovery};
pub use error::{ConfigError, ConvertError, GlyphError, Result};
pub use llm::{ImageInput, ProviderFactory, VisionProvider, VisionRequest, VisionResponse};
pub use runlog::RunLog;

/// Library version.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
