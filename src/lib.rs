pub mod budget;
pub mod catalog;
pub mod config;
pub mod error;
pub mod executor;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod orchestrator;
pub mod providers;
pub mod rate_limiter;
pub mod selection;
pub mod usage;

pub use executor::CompletionOptions;
pub use models::openrouter::Message;
pub use orchestrator::{CompletionResult, Orchestrator};
pub use usage::UsageStats;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize tracing/logging
///
/// Logs go to stderr; `json` switches to structured JSON lines. Can only be called once.
pub fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);

    if json {
        registry
            .with(fmt::layer().json().with_target(true).with_writer(std::io::stderr))
            .init();
    } else {
        registry
            .with(fmt::layer().with_target(true).with_writer(std::io::stderr))
            .init();
    }
}
