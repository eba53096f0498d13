//! Route definitions
//!
//! Relay-facing routes are mounted under /api/v1; probes stay at the root.

use axum::{
    routing::{get, post},
    Router,
};

use crate::handlers::{commands, events, health, roster};
use crate::state::AppState;

/// Create the main router with all routes
pub fn create_router() -> Router<AppState> {
    Router::new()
        .merge(health_routes())
        .nest("/api/v1", api_v1_routes())
}

/// Health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(event_routes())
        .merge(command_routes())
        .route("/roster", get(roster::get_roster))
}

/// Platform events forwarded by the relay
fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events/member-updated", post(events::member_updated))
        .route("/events/member-removed", post(events::member_removed))
        .route("/events/conversation-created", post(events::conversation_created))
        .route("/events/conversation-updated", post(events::conversation_updated))
        .route("/events/conversation-deleted", post(events::conversation_deleted))
}

/// Member and officer commands
fn command_routes() -> Router<AppState> {
    Router::new()
        .route("/commands/set-name", post(commands::set_name))
        .route("/commands/override-name", post(commands::override_name))
        .route("/commands/lookup-info", post(commands::lookup_info))
        .route("/commands/update-review", post(commands::update_review))
}
