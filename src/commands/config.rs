use anyhow::Result;
use colored::Colorize;
use llm_orchestrator::config::{self, Config};
use llm_orchestrator::logging::mask_api_key;
use std::path::Path;
use tracing::info;

/// Execute the config show command
///
/// Displays the current configuration with secrets masked
pub fn show(config_path: &Path) -> Result<()> {
    println!("{}", "Loading configuration...".yellow());
    info!("Loading configuration for display");

    let cfg = config::load_config(config_path)?;
    let sanitized = sanitize_secrets(&cfg);

    println!("{}", "Current Configuration:".green().bold());
    println!();

    let toml_string = toml::to_string_pretty(&sanitized)?;
    println!("{}", toml_string);

    info!("Configuration displayed successfully");
    Ok(())
}

/// Execute the config validate command
pub fn validate(config_path: &Path) -> Result<()> {
    println!("{}", "Validating configuration...".yellow());
    info!("Validating configuration file");

    let cfg = config::load_config(config_path)?;

    println!("{}", "✓ Configuration is valid".green());
    println!();
    println!("{}", "Summary:".bold());
    println!("  Models: {}", cfg.models.len());
    println!("  Fallback links: {}", count_fallback_links(&cfg));
    println!("  Selection Rules: {}", cfg.selection.rules.len());

    info!("Configuration validation successful");
    Ok(())
}

fn sanitize_secrets(cfg: &Config) -> Config {
    let mut sanitized = cfg.clone();
    sanitized.openrouter.api_key = mask_api_key(&sanitized.openrouter.api_key);
    sanitized
}

fn count_fallback_links(cfg: &Config) -> usize {
    cfg.models.iter().map(|m| m.fallback_ids.len()).sum()
}
