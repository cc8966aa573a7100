//! Guided conversion flow.
//!
//! Walks the user through: working directory → file discovery → model
//! selection → API key check → confirmation → conversion. Builds a
//! `ConvertArgs` and delegates to `cli::convert::execute()`.

use crate::cli::convert::ConvertArgs;
use console::Style;
use dialoguer::{Confirm, Input, Password, Select};
use glyph_core::llm::resolve_env_var;
use glyph_core::{Config, FileDiscovery, ModelEntry, ProviderKind};
use std::path::PathBuf;

use super::theme::glyph_theme;

/// Walk the user through the full conversion flow.
pub async fn guided_convert(config: &Config) -> anyhow::Result<()> {
    let theme = glyph_theme();

    // ── Steps 1+2: Working directory with file discovery ──────────────────
    // Combined loop: re-prompts on both "path not found" and "no images found".

    let (input, files) = loop {
        let Some(raw_path) = super::handle_interrupt(
            Input::<String>::with_theme(&theme)
                .with_prompt("Directory of images to convert")
                .default(".".to_string())
                .interact_text(),
        )?
        else {
            return Ok(());
        };

        let path = PathBuf::from(shellexpand::tilde(&raw_path).into_owned());

        if !path.exists() {
            let warn = Style::new().for_stderr().yellow();
            eprintln!(
                "  {}",
                warn.apply_to(format!("Path not found: {}", path.display()))
            );
            continue;
        }

        let discovery = FileDiscovery::new(config.processing.clone());
        let found = discovery.discover(&path);

        if found.is_empty() {
            let warn = Style::new().for_stderr().yellow();
            eprintln!(
                "  {}",
                warn.apply_to("No supported images found at that path.")
            );
            continue;
        }

        break (path, found);
    };

    let total_size = FileDiscovery::total_size(&files);
    let dim = Style::new().for_stderr().dim();
    eprintln!(
        "  {}",
        dim.apply_to(format!(
            "Found {} image(s) ({:.1} MB)",
            files.len(),
            total_size as f64 / 1_000_000.0
        ))
    );

    // ── Step 3: Model selection from the catalog ───────────────────────────

    let items: Vec<String> = config
        .models
        .iter()
        .map(|m| format!("{} — {} ({})", m.id, m.description, m.provider))
        .collect();
    let default_index = config
        .models
        .iter()
        .position(|m| m.id == config.default_model)
        .unwrap_or(0);

    let model_choice = Select::with_theme(&theme)
        .with_prompt("Model")
        .items(&items)
        .default(default_index)
        .interact_opt()?;

    let Some(model_choice) = model_choice else {
        return Ok(()); // Esc
    };
    let model = &config.models[model_choice];

    // ── Step 4: API key check ──────────────────────────────────────────────

    let api_key = if configured_key(config, model).is_some() {
        None
    } else {
        eprintln!(
            "  {}",
            dim.apply_to(format!(
                "No API key configured for {} — it will be used for this session only.",
                model.provider
            ))
        );
        let Some(key) = super::handle_interrupt(
            Password::with_theme(&theme)
                .with_prompt(format!("{} API key", model.provider))
                .interact(),
        )?
        else {
            return Ok(());
        };
        Some(key)
    };

    // ── Step 5: Confirmation ───────────────────────────────────────────────

    let confirmed = Confirm::with_theme(&theme)
        .with_prompt(format!(
            "Convert {} image(s) in {} with {}?",
            files.len(),
            input.display(),
            model.id
        ))
        .default(true)
        .interact_opt()?;

    if !matches!(confirmed, Some(true)) {
        return Ok(());
    }

    // ── Step 6: Delegate to the flag-based path ────────────────────────────

    let args = ConvertArgs {
        input,
        model: Some(model.id.clone()),
        output_dir: None,
        api_key,
    };

    if let Err(e) = crate::cli::convert::execute(args, config.clone()).await {
        let err = Style::new().for_stderr().red();
        eprintln!("  {} {e}", err.apply_to("✗"));
    }

    Ok(())
}

/// The key configured for a model's provider, if any resolves.
fn configured_key(config: &Config, model: &ModelEntry) -> Option<String> {
    let raw = match model.provider {
        ProviderKind::Anthropic => config.llm.anthropic.as_ref().map(|c| c.api_key.clone()),
        ProviderKind::Gemini => config.llm.gemini.as_ref().map(|c| c.api_key.clone()),
        ProviderKind::Mistral => config.llm.mistral.as_ref().map(|c| c.api_key.clone()),
    };
    // An unset section still falls back to the default ${ENV_VAR} reference
    let raw = raw.unwrap_or_else(|| default_env_reference(model.provider));
    resolve_env_var(&raw)
}

fn default_env_reference(provider: ProviderKind) -> String {
    match provider {
        ProviderKind::Anthropic => "${ANTHROPIC_API_KEY}".to_string(),
        ProviderKind::Gemini => "${GEMINI_API_KEY}".to_string(),
        ProviderKind::Mistral => "${MISTRAL_API_KEY}".to_string(),
    }
}
