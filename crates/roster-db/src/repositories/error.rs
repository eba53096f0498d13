//! Error handling utilities for the record store

use roster_core::error::{DomainError, StoreUnavailable};
use sqlx::Error as SqlxError;

/// Convert a failed lookup into the "store unreachable" signal
pub fn map_lookup_error(e: SqlxError) -> StoreUnavailable {
    StoreUnavailable::Unreachable(e.to_string())
}

/// Convert a failed write into a DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    if matches!(
        e,
        SqlxError::PoolTimedOut | SqlxError::PoolClosed | SqlxError::Io(_)
    ) {
        return DomainError::StoreUnavailable(map_lookup_error(e));
    }
    DomainError::InternalError(format!("record store: {e}"))
}
