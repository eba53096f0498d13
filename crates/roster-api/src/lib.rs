//! # roster-api
//!
//! HTTP server built with Axum. Accepts platform events and member commands
//! from the relay and serves the roster snapshot and health probes.

pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod response;
pub mod routes;
pub mod server;
pub mod state;

pub use server::{create_app, create_app_state, run, run_server, shutdown_signal};
pub use state::AppState;
