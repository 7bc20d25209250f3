use anyhow::Result;
use colored::Colorize;
use llm_orchestrator::{
    config,
    models::openrouter::build_messages,
    usage::AlertLevel,
    CompletionOptions, Orchestrator,
};
use std::path::Path;
use tracing::info;

pub struct CompleteArgs<'a> {
    pub config_path: &'a Path,
    pub model: Option<String>,
    pub system: Option<String>,
    pub max_tokens: Option<u32>,
    pub temperature: Option<f32>,
    pub use_fallback: bool,
    pub json: bool,
    pub prompt: String,
}

/// Execute the complete command
///
/// Runs a single completion and prints the result with the usage snapshot
pub async fn execute(args: CompleteArgs<'_>) -> Result<()> {
    let cfg = config::load_config(args.config_path)?;
    let orchestrator = Orchestrator::new(&cfg)?;

    let model = args
        .model
        .unwrap_or_else(|| cfg.selection.default_model.clone());
    let messages = build_messages(&args.prompt, args.system.as_deref());
    let options = CompletionOptions {
        max_tokens: args.max_tokens,
        temperature: args.temperature,
    };

    info!(model = %model, use_fallback = args.use_fallback, "Running completion");
    let result = orchestrator
        .complete(&model, &messages, options, args.use_fallback)
        .await;
    let reporter = orchestrator.usage_reporter();
    let usage = reporter.usage_stats().await;
    let alerts = reporter.cost_alerts().await;

    if args.json {
        let output = serde_json::json!({
            "result": result,
            "usage": usage,
            "alerts": alerts,
        });
        println!("{}", serde_json::to_string_pretty(&output)?);
    } else if result.success {
        println!("{}", result.content);
        println!();
        println!(
            "{} {} ({} in / {} out, ${:.6}, {:.2}s, attempt {})",
            "✓".green(),
            result.model_used.cyan(),
            result.input_tokens,
            result.output_tokens,
            result.cost,
            result.response_time,
            result.attempts
        );
        if result.fallback_used {
            println!("  {} requested {}", "fallback:".yellow(), model);
        }
        println!(
            "  {}: ${:.4} / ${:.2} today, ${:.4} / ${:.2} this month",
            "Budget".cyan(),
            usage.daily_usage,
            usage.daily_budget,
            usage.monthly_usage,
            usage.monthly_budget
        );
    } else {
        println!(
            "{} {} after {} attempt(s): {}",
            "✗".red(),
            result.model_used,
            result.attempts,
            result.error.as_deref().unwrap_or("unknown error").red()
        );
    }

    if !args.json {
        for alert in &alerts {
            let line = format!("{:?}: {}", alert.level, alert.message);
            match alert.level {
                AlertLevel::Warning => println!("  {}", line.yellow()),
                AlertLevel::Critical => println!("  {}", line.red().bold()),
            }
        }
    }

    if !result.success {
        anyhow::bail!("completion failed");
    }

    Ok(())
}
