//! # roster-common
//!
//! Shared utilities including configuration, layout loading, error handling, and telemetry.

pub mod config;
pub mod error;
pub mod telemetry;

// Re-export commonly used types at crate root
pub use config::{
    load_layout, parse_layout, AppConfig, AppSettings, ConfigError, DatabaseConfig,
    DiscordConfig, Environment, RelayConfig, ScheduleConfig, ServerConfig, SheetsConfig,
};
pub use error::{AppError, AppResult, ErrorResponse};
pub use telemetry::{try_init_tracing, try_init_tracing_with_config, TracingConfig, TracingError};
