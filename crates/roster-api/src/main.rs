//! Roster sync server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p roster-api
//! ```
//!
//! Credentials come from environment variables (or `.env`); the community
//! layout comes from `config/roster.toml` unless `ROSTER_LAYOUT_PATH` says otherwise.

use roster_common::{load_layout, try_init_tracing_with_config, AppConfig, TracingConfig};
use tracing::{error, info};

#[tokio::main(flavor = "current_thread")]
async fn main() {
    // Pick up RUST_LOG and APP_ENV from .env before the subscriber is built
    dotenvy::dotenv().ok();

    let env = std::env::var("APP_ENV")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or_default();
    if let Err(e) = try_init_tracing_with_config(&TracingConfig::for_environment(env)) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    if let Err(e) = run().await {
        error!(error = %e, "Server failed");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    info!("Starting roster sync server...");

    let config = AppConfig::from_env().map_err(|e| {
        error!(error = %e, "Failed to load configuration");
        e
    })?;

    let layout = load_layout(&config.app.layout_path).map_err(|e| {
        error!(error = %e, path = %config.app.layout_path, "Failed to load roster layout");
        e
    })?;

    info!(
        env = ?config.app.env,
        port = config.api.port,
        community_id = %layout.community_id,
        categories = layout.class_categories.len(),
        "Configuration loaded"
    );

    roster_api::run(config, layout).await?;

    Ok(())
}
