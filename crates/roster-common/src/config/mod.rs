//! Configuration structs and loaders

mod app_config;
mod layout_loader;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, DatabaseConfig, DiscordConfig, Environment,
    RelayConfig, ScheduleConfig, ServerConfig, SheetsConfig,
};
pub use layout_loader::{load_layout, parse_layout};
