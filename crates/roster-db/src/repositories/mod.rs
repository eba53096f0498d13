//! Repository implementations
//!
//! PostgreSQL implementation of the record store port defined in roster-core.

mod error;
mod record_store;

pub use error::{map_db_error, map_lookup_error};
pub use record_store::PgRecordStore;
