//! Command implementations for the CLI
//!
//! - complete: run one completion through the orchestrator
//! - models / select: inspect the catalog and task-based selection
//! - test: Test configuration validity
//! - config: Configuration display and validation

pub mod complete;
pub mod config;
pub mod models;
