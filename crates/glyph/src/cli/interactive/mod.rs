//! Interactive CLI mode — guided experience for bare `glyph` invocation.
//!
//! When `glyph` is invoked with no subcommand on a TTY, this module
//! provides a menu-driven interface that delegates to the same conversion
//! logic as the flag-based CLI.

pub mod convert;
pub mod theme;

use console::Style;
use dialoguer::Select;
use glyph_core::Config;

/// Convert a dialoguer result into `Ok(Some(value))` on success, `Ok(None)` on
/// interrupt (Ctrl+C / terminal disconnect), and `Err` for other I/O failures.
///
/// Use this to wrap `interact_text()` / `interact()` calls that lack an `_opt`
/// variant, so interrupts exit the current flow cleanly instead of panicking.
fn handle_interrupt<T>(result: dialoguer::Result<T>) -> anyhow::Result<Option<T>> {
    match result {
        Ok(v) => Ok(Some(v)),
        Err(dialoguer::Error::IO(e)) if e.kind() == std::io::ErrorKind::Interrupted => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Main menu options presented to the user.
const MENU_ITEMS: &[&str] = &[
    "Convert images",
    "List models",
    "Show configuration",
    "Exit",
];

/// Entry point for interactive mode. Called when `glyph` is invoked with no subcommand on a TTY.
pub async fn run(config: &Config) -> anyhow::Result<()> {
    theme::print_banner();

    let theme = theme::glyph_theme();

    loop {
        let selection = Select::with_theme(&theme)
            .with_prompt("What would you like to do?")
            .items(MENU_ITEMS)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => convert::guided_convert(config).await?,
            Some(1) => list_models(config),
            Some(2) => show_config(config)?,
            Some(3) | None => break, // Exit or Ctrl+C / Esc
            _ => unreachable!(),
        }
    }

    Ok(())
}

/// Print the model catalog with the default marked.
fn list_models(config: &Config) {
    let cyan = Style::new().for_stderr().cyan();
    let dim = Style::new().for_stderr().dim();

    eprintln!();
    eprintln!("  {}", cyan.apply_to("Known models:"));
    for entry in &config.models {
        let marker = if entry.id == config.default_model {
            " (default)"
        } else {
            ""
        };
        eprintln!(
            "    {:<28} {}{marker}",
            entry.id,
            dim.apply_to(format!("{} — {}", entry.provider, entry.description))
        );
    }
    eprintln!();
}

/// Interactive config viewer — shows a summary of current settings and
/// offers to display the full TOML or the config file path.
fn show_config(config: &Config) -> anyhow::Result<()> {
    let theme = theme::glyph_theme();
    let dim = Style::new().for_stderr().dim();
    let cyan = Style::new().for_stderr().cyan();
    let label = Style::new().for_stderr().bold();

    loop {
        // Config summary
        eprintln!();
        eprintln!("  {}", cyan.apply_to("Current configuration:"));
        eprintln!();

        let config_path = Config::default_path();
        let path_note = if config_path.exists() {
            "(exists)"
        } else {
            "(using defaults)"
        };

        eprintln!(
            "    {:<20} {} {}",
            label.apply_to("Config file:"),
            config_path.display(),
            dim.apply_to(path_note)
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Default model:"),
            config.default_model
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Catalog:"),
            format!("{} model(s)", config.models.len())
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Formats:"),
            config.processing.supported_formats.join(", ")
        );
        eprintln!(
            "    {:<20} {}ms",
            label.apply_to("Request timeout:"),
            config.limits.request_timeout_ms
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Output dir:"),
            config
                .output_dir()
                .map(|d| d.display().to_string())
                .unwrap_or_else(|| "next to sources".to_string())
        );
        eprintln!(
            "    {:<20} {}",
            label.apply_to("Log level:"),
            config.logging.level
        );
        eprintln!();

        // Action menu
        let items = &["View full config (TOML)", "Show config file path", "Back"];

        let selection = Select::with_theme(&theme)
            .with_prompt("Configuration")
            .items(items)
            .default(0)
            .interact_opt()?;

        match selection {
            Some(0) => match config.to_toml() {
                Ok(toml) => {
                    eprintln!();
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!("{toml}");
                    eprintln!("{}", dim.apply_to("─".repeat(50)));
                    eprintln!();
                }
                Err(e) => {
                    let err = Style::new().for_stderr().red();
                    eprintln!("  {} Failed to serialize config: {e}", err.apply_to("✗"));
                    eprintln!();
                }
            },
            Some(1) => {
                eprintln!();
                eprintln!("  {}", Config::default_path().display());
                eprintln!();
            }
            Some(2) | None => break, // Back or Esc / Ctrl+C
            _ => unreachable!(),
        }
    }

    Ok(())
}
