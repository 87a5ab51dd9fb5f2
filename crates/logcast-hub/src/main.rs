//! Logcast hub host entry point
//!
//! Run with:
//! ```bash
//! cargo run -p logcast-hub
//! ```
//!
//! Configuration is loaded from environment variables.

use logcast_common::{try_init_tracing, AppConfig};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Initialize tracing
    if let Err(e) = try_init_tracing() {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Hub host failed to start");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting Logcast hub host...");

    // Load configuration
    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    info!(
        env = ?config.app.env,
        port = config.hub.port,
        heartbeat_interval_ms = config.hub.heartbeat_interval_ms,
        "Configuration loaded"
    );

    logcast_hub::run(config).await?;

    Ok(())
}
