//! The `glyph convert` command: batch conversion with progress and summary.

use clap::Args;
use glyph_core::{
    convert_files, Config, ConvertOptions, FileDiscovery, ModelEntry, ProviderFactory, ProviderKind,
    RunLog,
};
use std::path::PathBuf;
use std::time::Duration;

/// Arguments for the `convert` command.
#[derive(Args, Debug)]
pub struct ConvertArgs {
    /// Directory of images to convert (or a single image file)
    #[arg(default_value = ".")]
    pub input: PathBuf,

    /// Model id from the catalog (see `glyph models`); defaults to the configured model
    #[arg(short, long)]
    pub model: Option<String>,

    /// Write Markdown files here instead of next to the source images
    #[arg(short, long)]
    pub output_dir: Option<PathBuf>,

    /// API key for the selected provider (session-only, set by interactive mode).
    #[arg(skip)]
    pub api_key: Option<String>,
}

/// Manual Default impl for constructing ConvertArgs outside of clap.
///
/// Values match the clap `#[arg(default_value = ...)]` annotations above.
/// Used by the interactive module to build ConvertArgs field-by-field.
impl Default for ConvertArgs {
    fn default() -> Self {
        Self {
            input: PathBuf::from("."),
            model: None,
            output_dir: None,
            api_key: None,
        }
    }
}

/// Execute the convert command.
pub async fn execute(args: ConvertArgs, mut config: Config) -> anyhow::Result<()> {
    let input = PathBuf::from(shellexpand::tilde(&args.input.to_string_lossy()).into_owned());

    if !input.exists() {
        anyhow::bail!(
            "Input path does not exist: {:?}\n\n  Hint: Check the directory path and try again.",
            input
        );
    }

    // Resolve the model against the catalog before touching any file
    let model = config.resolve_model(args.model.as_deref())?.clone();
    tracing::info!("Using model {} via {}", model.id, model.provider);

    // If the interactive flow provided a session API key, inject it into
    // the config so the factory picks it up without needing env vars.
    if let Some(ref key) = args.api_key {
        inject_api_key(&mut config, &model, key);
    }

    let timeout = Duration::from_millis(config.limits.request_timeout_ms);
    let provider = ProviderFactory::create(&model, &config.llm, timeout)?;

    let mut options = ConvertOptions::from_config(&config)?;
    if args.output_dir.is_some() {
        options.output_dir = args.output_dir.clone();
    }
    if let Some(ref dir) = options.output_dir {
        std::fs::create_dir_all(dir)?;
    }

    let files = FileDiscovery::new(config.processing.clone()).discover(&input);
    if files.is_empty() {
        tracing::warn!(
            "No supported image files found at {:?} (supported: {})",
            input,
            config.processing.supported_formats.join(", ")
        );
        return Ok(());
    }
    tracing::info!("Found {} image(s) to convert", files.len());

    // The run log lives in the working directory being processed
    let log_dir = if input.is_dir() {
        input.clone()
    } else {
        input.parent().map(PathBuf::from).unwrap_or_else(|| PathBuf::from("."))
    };
    let mut log = RunLog::create(&log_dir)?;

    let progress = create_progress_bar(files.len() as u64);
    let summary = convert_files(&files, provider.as_ref(), &options, &mut log, |path, _| {
        progress.set_message(
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default(),
        );
        progress.inc(1);
    })
    .await;
    progress.finish_and_clear();

    print_summary(&summary, log.path());

    // A batch that ran is a success even with partial failures; only a
    // total wipe-out reports a failing exit code.
    if summary.all_failed() {
        anyhow::bail!(
            "All {} file(s) failed — see run log at {:?}",
            summary.discovered,
            log.path()
        );
    }

    Ok(())
}

/// Inject a session API key into the config for the model's provider.
pub fn inject_api_key(config: &mut Config, model: &ModelEntry, key: &str) {
    match model.provider {
        ProviderKind::Anthropic => {
            let cfg = config.llm.anthropic.get_or_insert_with(Default::default);
            cfg.api_key = key.to_string();
        }
        ProviderKind::Gemini => {
            let cfg = config.llm.gemini.get_or_insert_with(Default::default);
            cfg.api_key = key.to_string();
        }
        ProviderKind::Mistral => {
            let cfg = config.llm.mistral.get_or_insert_with(Default::default);
            cfg.api_key = key.to_string();
        }
    }
}

/// Create a progress bar for batch conversion.
fn create_progress_bar(total: u64) -> indicatif::ProgressBar {
    use indicatif::{ProgressBar, ProgressStyle};

    let pb = ProgressBar::new(total);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
            )
            .unwrap()
            .progress_chars("##-"),
    );
    pb.set_message("starting...");
    pb
}

/// Print a formatted summary block after the batch.
fn print_summary(summary: &glyph_core::RunSummary, log_path: &std::path::Path) {
    eprintln!();
    eprintln!("  ====================================");
    eprintln!("               Summary");
    eprintln!("  ====================================");
    eprintln!("    Succeeded:    {:>8}", summary.succeeded);
    if summary.failed > 0 {
        eprintln!("    Failed:       {:>8}", summary.failed);
    }
    eprintln!("  ------------------------------------");
    eprintln!("    Total:        {:>8}", summary.discovered);
    eprintln!("    Duration:     {:>7.1}s", summary.duration.as_secs_f64());
    eprintln!("    Run log:      {}", log_path.display());
    eprintln!("  ====================================");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn convert_args_default_input_is_current_dir() {
        let args = ConvertArgs::default();
        assert_eq!(args.input, PathBuf::from("."));
    }

    #[test]
    fn convert_args_default_option_fields_are_none() {
        let args = ConvertArgs::default();
        assert!(args.model.is_none());
        assert!(args.output_dir.is_none());
        assert!(args.api_key.is_none());
    }

    #[test]
    fn inject_api_key_reaches_the_right_provider() {
        let mut config = Config::default();
        let model = config
            .resolve_model(Some("gemini-3-flash-preview"))
            .unwrap()
            .clone();

        inject_api_key(&mut config, &model, "session-key");

        assert_eq!(
            config.llm.gemini.as_ref().unwrap().api_key,
            "session-key"
        );
        // Other providers untouched
        assert!(config.llm.anthropic.is_none());
    }
}
