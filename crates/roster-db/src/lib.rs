//! # roster-db
//!
//! Record store implementation over PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides the PostgreSQL implementation of the `RecordStore`
//! port defined in `roster-core`. It handles:
//!
//! - Connection pool management
//! - Database models with SQLx `FromRow` derives
//! - Model -> entity mappers (storage column names stop here)
//! - The `PgRecordStore` repository
//!
//! ## Usage
//!
//! ```rust,ignore
//! use roster_db::{create_pool, ensure_schema, DatabaseConfig, PgRecordStore};
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::default())?;
//!     ensure_schema(&pool).await?;
//!     let store = PgRecordStore::new(pool);
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;
pub mod schema;

// Re-export commonly used types
pub use pool::{create_pool, DatabaseConfig, PgPool};
pub use repositories::PgRecordStore;
pub use schema::ensure_schema;
