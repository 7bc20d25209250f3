use anyhow::{anyhow, Result};
use colored::Colorize;
use llm_orchestrator::{
    catalog::ModelCatalog,
    config,
    selection::{Language, ModelSelector, UseCase},
};
use std::path::Path;

/// Execute the models command
///
/// Lists the catalog in declaration order with per-1K prices and fallback chains
pub fn execute(config_path: &Path) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let catalog = ModelCatalog::new(cfg.models);

    println!("{}", format!("Models ({}):", catalog.len()).bold());
    for model in catalog.iter() {
        println!(
            "  {}  max_tokens={} temperature={} top_p={}",
            model.id.cyan(),
            model.max_tokens,
            model.temperature,
            model.top_p
        );
        println!(
            "    price: ${:.4} in / ${:.4} out per 1K tokens",
            model.input_price * 1000.0,
            model.output_price * 1000.0
        );
        if model.fallback_ids.is_empty() {
            println!("    fallbacks: {}", "(none)".dimmed());
        } else {
            println!("    fallbacks: {}", model.fallback_ids.join(" → "));
        }
    }

    Ok(())
}

/// Execute the select command
pub fn select(config_path: &Path, language: &str, use_case: &str, free_tier: bool) -> Result<()> {
    let cfg = config::load_config(config_path)?;
    let language: Language = language.parse().map_err(|e: String| anyhow!(e))?;
    let use_case: UseCase = use_case.parse().map_err(|e: String| anyhow!(e))?;

    let model = ModelSelector::new(&cfg.selection).model_for_task(language, use_case, free_tier);
    println!("{}", model);

    Ok(())
}
