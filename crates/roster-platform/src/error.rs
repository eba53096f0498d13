//! Adapter errors

use roster_core::DomainError;

/// Errors from outbound HTTP adapters
#[derive(Debug, thiserror::Error)]
pub enum PlatformError {
    #[error("HTTP {status:?}: {message}")]
    Http {
        status: Option<u16>,
        message: String,
    },

    #[error("Rate limited after {attempts} attempts")]
    RateLimited { attempts: u32 },

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Invalid credentials: {0}")]
    Credentials(String),

    #[error("JWT signing failed: {0}")]
    Jwt(String),

    #[error("Invalid URL: {0}")]
    Url(String),
}

impl PlatformError {
    /// Status code of a failed HTTP response, if there was one
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => *status,
            _ => None,
        }
    }

    /// Wrap as a platform (member/role/thread) failure
    pub fn into_platform(self) -> DomainError {
        DomainError::PlatformError(self.to_string())
    }

    /// Wrap as an export sink failure
    pub fn into_sink(self) -> DomainError {
        DomainError::SinkError(self.to_string())
    }
}

impl From<reqwest::Error> for PlatformError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            return Self::Decode(err.to_string());
        }
        Self::Http {
            status: err.status().map(|s| s.as_u16()),
            message: err.to_string(),
        }
    }
}

/// Read a failed response into a PlatformError
pub(crate) async fn error_from_response(response: reqwest::Response) -> PlatformError {
    let status = response.status().as_u16();
    let message = response
        .text()
        .await
        .unwrap_or_else(|_| "unable to read response body".to_string());
    PlatformError::Http {
        status: Some(status),
        message,
    }
}
