//! Axum extractors for request handling
//!
//! Custom extractors for relay authentication and JSON bodies.

mod auth;
mod validated;

pub use auth::RelayAuth;
pub use validated::{JsonBody, ValidatedJson};
