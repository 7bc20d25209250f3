use anyhow::Result;
use clap::Parser;

mod cli;
mod commands;

use llm_orchestrator::init_tracing;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    init_tracing(args.log_format == cli::LogFormat::Json);

    let metrics_handle = if args.metrics {
        Some(llm_orchestrator::metrics::init_metrics()?)
    } else {
        None
    };

    match args.command {
        cli::Commands::Complete {
            model,
            system,
            max_tokens,
            temperature,
            no_fallback,
            json,
            prompt,
        } => {
            commands::complete::execute(commands::complete::CompleteArgs {
                config_path: &args.config,
                model,
                system,
                max_tokens,
                temperature,
                use_fallback: !no_fallback,
                json,
                prompt,
            })
            .await?;
        }
        cli::Commands::Models => commands::models::execute(&args.config)?,
        cli::Commands::Select {
            language,
            use_case,
            free_tier,
        } => commands::models::select(&args.config, &language, &use_case, free_tier)?,
        cli::Commands::Test => commands::test::execute(&args.config)?,
        cli::Commands::Config { action } => match action {
            cli::ConfigCommands::Show => commands::config::show(&args.config)?,
            cli::ConfigCommands::Validate => commands::config::validate(&args.config)?,
        },
        cli::Commands::Version => {
            println!("LLM Orchestrator v{}", env!("CARGO_PKG_VERSION"));
        }
    }

    if let Some(handle) = metrics_handle {
        println!("{}", handle.render());
    }

    Ok(())
}
