use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "orchestrator", version, about = "Budget-aware LLM completion client")]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, default_value = "config.toml", global = true)]
    pub config: PathBuf,

    /// Log output format
    #[arg(long, value_enum, default_value_t = LogFormat::Pretty, global = true)]
    pub log_format: LogFormat,

    /// Print Prometheus metrics after the command finishes
    #[arg(long, global = true)]
    pub metrics: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Run one completion with budget, rate limit and fallback
    Complete {
        /// Primary model id (defaults to the selection default model)
        #[arg(short, long)]
        model: Option<String>,

        /// Optional system prompt
        #[arg(short, long)]
        system: Option<String>,

        /// Override the model's max_tokens
        #[arg(long)]
        max_tokens: Option<u32>,

        /// Override the model's temperature
        #[arg(long)]
        temperature: Option<f32>,

        /// Only try the requested model
        #[arg(long)]
        no_fallback: bool,

        /// Print the result as JSON
        #[arg(long)]
        json: bool,

        /// User prompt
        prompt: String,
    },

    /// List configured models, prices and fallback chains
    Models,

    /// Show which model a task would use
    Select {
        /// Content language: ar, en or auto
        #[arg(short, long, default_value = "auto")]
        language: String,

        /// Use case: sentiment, message_gen, cultural, chat or persona
        #[arg(short, long)]
        use_case: String,

        /// Use the free-tier model
        #[arg(long)]
        free_tier: bool,
    },

    /// Test configuration file validity
    Test,

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        action: ConfigCommands,
    },

    /// Show version information
    Version,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Display current configuration (with secrets masked)
    Show,
    /// Validate configuration file
    Validate,
}
