//! Thoughtful server
//!
//! Entry point for the thought enrichment backend.

use std::sync::Arc;

use dotenvy::dotenv;
use mimalloc::MiMalloc;
use tracing::info;

use thoughtful::config::AppConfig;

/// Global allocator for improved performance (M-MIMALLOC-APPS).
#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() {
    // Load .env (if present)
    let _ = dotenv();

    let config = match AppConfig::load() {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Configuration error: {e}");
            std::process::exit(1);
        }
    };

    if let Err(msg) = config.validate() {
        eprintln!("Configuration error: {msg}");
        std::process::exit(1);
    }

    thoughtful::telemetry::init(config.telemetry.json);

    info!(
        name: "config.loaded",
        provider = %config.persistence.provider,
        port = config.server.port,
        "Configuration loaded"
    );

    if let Err(e) = thoughtful::server::start_server(Arc::new(config)).await {
        tracing::error!(error = ?e, "Server exited with error");
        std::process::exit(1);
    }
}
