//! glyph CLI - Batch-convert images of structured content to Markdown.
//!
//! glyph scans a working directory for images (tables, charts, formulas,
//! diagrams), sends each one to a vision-language model, and writes the
//! returned Markdown next to the source image.
//!
//! # Usage
//!
//! ```bash
//! # Convert every image in the current directory
//! glyph convert
//!
//! # Convert a specific directory with a specific model
//! glyph convert ./scans --model gemini-3-flash-preview
//!
//! # List the model catalog
//! glyph models
//!
//! # View configuration
//! glyph config show
//! ```
//!
//! Invoked bare on a terminal, glyph starts a guided interactive mode.

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// glyph - Convert images of structured content to Markdown via vision language models.
#[derive(Parser, Debug)]
#[command(name = "glyph")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Convert images in a directory to Markdown
    Convert(cli::convert::ConvertArgs),

    /// List the known vision model catalog
    Models(cli::models::ModelsArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging from config, with CLI overrides.
    // Note: logging isn't initialized yet, so use eprintln for config warnings.
    let config = match glyph_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `glyph config path`."
            );
            glyph_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("glyph v{}", glyph_core::VERSION);

    // Dispatch to the appropriate command handler
    match cli.command {
        Some(Commands::Convert(args)) => cli::convert::execute(args, config).await,
        Some(Commands::Models(args)) => cli::models::execute(args, &config),
        Some(Commands::Config(args)) => cli::config::execute(args),
        None => {
            if console::user_attended() {
                cli::interactive::run(&config).await
            } else {
                anyhow::bail!(
                    "No command given and no terminal attached. \
                     Try `glyph convert <DIR>` or `glyph --help`."
                )
            }
        }
    }
}
