//! Application state
//!
//! Holds the engine's service context and the relay secret that inbound
//! requests must present.

use std::sync::Arc;

use roster_service::ServiceContext;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    service_context: Arc<ServiceContext>,
    relay_secret: Arc<str>,
}

impl AppState {
    /// Create a new AppState
    pub fn new(service_context: ServiceContext, relay_secret: impl Into<Arc<str>>) -> Self {
        Self {
            service_context: Arc::new(service_context),
            relay_secret: relay_secret.into(),
        }
    }

    /// Get the service context
    pub fn service_context(&self) -> &ServiceContext {
        &self.service_context
    }

    /// Check a presented bearer token against the relay secret
    pub fn accepts_token(&self, token: &str) -> bool {
        let expected = self.relay_secret.as_bytes();
        let given = token.as_bytes();
        // Compare every byte so timing does not leak the matching prefix
        expected.len() == given.len()
            && expected
                .iter()
                .zip(given)
                .fold(0u8, |acc, (a, b)| acc | (a ^ b))
                == 0
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("service_context", &self.service_context)
            .field("relay_secret", &"<redacted>")
            .finish()
    }
}
