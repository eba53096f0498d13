//! Server setup and initialization
//!
//! Wires the ports into a service context, runs the startup pass, starts the
//! background schedulers, and serves HTTP until a shutdown signal arrives.

use std::sync::Arc;

use axum::Router;
use roster_common::{AppConfig, AppError};
use roster_core::RosterLayout;
use roster_db::{create_pool, ensure_schema, PgRecordStore};
use roster_platform::{DiscordClient, SheetsSink};
use roster_service::{ServiceContext, ShutdownSignal};
use tokio::net::TcpListener;
use tracing::{info, warn};

use crate::middleware::apply_middleware;
use crate::routes::create_router;
use crate::state::AppState;

/// Build the complete Axum application with all routes and middleware
pub fn create_app(state: AppState) -> Router {
    let router = create_router();
    let router = apply_middleware(router);
    router.with_state(state)
}

/// Initialize all dependencies and create AppState
pub async fn create_app_state(
    config: &AppConfig,
    layout: RosterLayout,
    shutdown: ShutdownSignal,
) -> Result<AppState, AppError> {
    info!("Connecting to PostgreSQL...");
    let pool = create_pool(&roster_db::DatabaseConfig::from(&config.database))
        .map_err(|e| AppError::Database(e.to_string()))?;
    ensure_schema(&pool)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;

    let platform = DiscordClient::new(&config.discord, layout.community_id)
        .map_err(|e| AppError::Config(e.to_string()))?;
    let sink = SheetsSink::new(&config.sheets).map_err(|e| AppError::Config(e.to_string()))?;

    let service_context = ServiceContext::new(
        Arc::new(layout),
        Arc::new(PgRecordStore::new(pool)),
        Arc::new(platform),
        Arc::new(sink),
        &config.schedule,
        shutdown,
    );

    Ok(AppState::new(service_context, config.relay.secret.as_str()))
}

/// Resolve when Ctrl-C or SIGTERM arrives, then trip the engine's shutdown signal
pub async fn shutdown_signal(shutdown: ShutdownSignal) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "Failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
        () = shutdown.wait() => {},
    }

    info!("Shutdown signal received");
    shutdown.trigger();
}

/// Serve the application until the shutdown signal fires
pub async fn run_server(
    app: Router,
    listener: TcpListener,
    shutdown: ShutdownSignal,
) -> Result<(), AppError> {
    let addr = listener
        .local_addr()
        .map_err(|e| AppError::Config(e.to_string()))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await
        .map_err(|e| AppError::Config(format!("Server error: {e}")))?;

    Ok(())
}

/// Run the complete server with configuration
pub async fn run(config: AppConfig, layout: RosterLayout) -> Result<(), AppError> {
    let shutdown = ShutdownSignal::new();
    let state = create_app_state(&config, layout, shutdown.clone()).await?;
    let ctx = state.service_context();

    // Index and projection must be populated before events are served
    match ctx.sync().bootstrap().await {
        Ok(summary) => info!(?summary, "Startup pass complete"),
        Err(e) => warn!(error = %e, "Startup pass aborted; the periodic sync will retry"),
    }

    let export_task = ctx.exporter().start();
    let sync_task = ctx.sync().start();

    let listener = TcpListener::bind(config.api.address())
        .await
        .map_err(|e| AppError::Config(format!("Failed to bind to {}: {e}", config.api.address())))?;

    let served = run_server(create_app(state.clone()), listener, shutdown.clone()).await;

    // The server may also stop on an error; make sure the schedulers see it
    shutdown.trigger();
    for (name, task) in [("export", export_task), ("sync", sync_task)] {
        if let Err(e) = task.await {
            warn!(task = name, error = %e, "Background task ended abnormally");
        }
    }
    info!("Shutdown complete");

    served
}
