//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::{NameRejection, Snowflake};

/// Why the record store could not serve a lookup
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreUnavailable {
    #[error("record store unreachable: {0}")]
    Unreachable(String),

    #[error("record store queries stopped for shutdown")]
    ShuttingDown,
}

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Member not found: {0}")]
    MemberNotFound(Snowflake),

    #[error("Member is not tracked: {0}")]
    MemberNotTracked(Snowflake),

    #[error("Member record not found: {0}")]
    RecordNotFound(Snowflake),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("{0}")]
    InvalidName(#[from] NameRejection),

    #[error("Invalid roster layout: {0}")]
    InvalidLayout(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not authorized to run this command")]
    NotAuthorized,

    #[error("Member is not in one of the guilds: {0}")]
    NotAffiliated(Snowflake),

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Cannot refresh the {0} check date while it is not checked")]
    ReviewDateRefreshRejected(&'static str),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error(transparent)]
    StoreUnavailable(#[from] StoreUnavailable),

    #[error("Platform error: {0}")]
    PlatformError(String),

    #[error("Export sink error: {0}")]
    SinkError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::MemberNotFound(_) => "UNKNOWN_MEMBER",
            Self::MemberNotTracked(_) => "MEMBER_NOT_TRACKED",
            Self::RecordNotFound(_) => "UNKNOWN_RECORD",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidName(_) => "INVALID_NAME",
            Self::InvalidLayout(_) => "INVALID_LAYOUT",

            // Authorization
            Self::NotAuthorized => "NOT_AUTHORIZED",
            Self::NotAffiliated(_) => "NOT_AFFILIATED",

            // Business Rules
            Self::ReviewDateRefreshRejected(_) => "REVIEW_DATE_REFRESH_REJECTED",

            // Infrastructure
            Self::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            Self::PlatformError(_) => "PLATFORM_ERROR",
            Self::SinkError(_) => "SINK_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::MemberNotFound(_) | Self::MemberNotTracked(_) | Self::RecordNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidName(_)
                | Self::InvalidLayout(_)
                | Self::ReviewDateRefreshRejected(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::NotAuthorized | Self::NotAffiliated(_))
    }

    /// Check if the record store could not be reached
    pub fn is_store_unavailable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }
}
