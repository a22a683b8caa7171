//! Hookbridge Server — Webhook Plugin Execution Bridge
//!
//! Main entry point that wires the crates together and starts the gRPC
//! executor service.

use std::sync::Arc;

use tracing_subscriber::{EnvFilter, fmt};

use hookbridge_core::config::AppConfig;
use hookbridge_core::{AppError, AppResult};
use hookbridge_executor::ExecutionEngine;

#[tokio::main]
async fn main() {
    let config = match load_configuration() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    init_logging(&config);

    if let Err(e) = run(config).await {
        tracing::error!("Server error: {}", e);
        std::process::exit(1);
    }
}

/// Load configuration from files and environment
fn load_configuration() -> Result<AppConfig, AppError> {
    let env = std::env::var("HOOKBRIDGE_ENV").unwrap_or_else(|_| "development".to_string());
    AppConfig::load(&env)
}

/// Initialize tracing/logging
fn init_logging(config: &AppConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    match config.logging.format.as_str() {
        "json" => {
            fmt()
                .json()
                .with_env_filter(filter)
                .with_target(true)
                .with_thread_ids(true)
                .init();
        }
        _ => {
            fmt()
                .pretty()
                .with_env_filter(filter)
                .with_target(true)
                .init();
        }
    }
}

/// Main server run function
async fn run(config: AppConfig) -> AppResult<()> {
    tracing::info!("Starting Hookbridge v{}", env!("CARGO_PKG_VERSION"));

    let engine = ExecutionEngine::with_dynamic_loader(config.plugins.clone());

    // Surface an empty or missing plugin directory at startup instead of on
    // the first request.
    if let Err(e) = engine.validate_environment() {
        tracing::warn!("Environment validation failed: {}", e);
    }

    hookbridge_rpc::serve(&config.server, Arc::new(engine)).await
}
