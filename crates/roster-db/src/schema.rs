//! Schema bootstrap

use sqlx::PgPool;
use tracing::info;

/// Tables used by the record store
pub const SCHEMA: &str = include_str!("../migrations/0001_member_records.sql");

/// Create the record tables if they do not exist yet
pub async fn ensure_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(SCHEMA).execute(pool).await?;
    info!("Record store schema ready");
    Ok(())
}
