//! The `glyph models` command: list the configured model catalog.

use clap::Args;
use glyph_core::Config;

/// Arguments for the `models` command.
#[derive(Args, Debug)]
pub struct ModelsArgs {
    /// Only list models served by this provider (anthropic, gemini, mistral)
    #[arg(short, long)]
    pub provider: Option<String>,
}

/// Execute the models command.
pub fn execute(args: ModelsArgs, config: &Config) -> anyhow::Result<()> {
    let entries: Vec<_> = config
        .models
        .iter()
        .filter(|m| match &args.provider {
            Some(p) => m.provider.to_string() == p.to_lowercase(),
            None => true,
        })
        .collect();

    if entries.is_empty() {
        anyhow::bail!(
            "No models match. Known providers: anthropic, gemini, mistral. \
             Edit the [[models]] catalog with `glyph config path`."
        );
    }

    println!("{:<28} {:<10} {}", "MODEL", "PROVIDER", "DESCRIPTION");
    for entry in entries {
        let marker = if entry.id == config.default_model {
            " (default)"
        } else {
            ""
        };
        println!(
            "{:<28} {:<10} {}{marker}",
            entry.id, entry.provider, entry.description
        );
    }

    Ok(())
}
