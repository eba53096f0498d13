//! Application configuration structs
//!
//! Credentials and endpoints come from environment variables (a `.env` file
//! is honored). Missing credentials are fatal at startup.

use serde::Deserialize;
use std::env;
use std::str::FromStr;
use std::time::Duration;

/// Main application configuration
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub database: DatabaseConfig,
    pub discord: DiscordConfig,
    pub sheets: SheetsConfig,
    pub relay: RelayConfig,
    pub schedule: ScheduleConfig,
}

/// General application settings
#[derive(Debug, Clone)]
pub struct AppSettings {
    pub name: String,
    pub env: Environment,
    /// Path to the community layout file
    pub layout_path: String,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

impl FromStr for Environment {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "production" => Ok(Self::Production),
            "staging" => Ok(Self::Staging),
            "development" => Ok(Self::Development),
            other => Err(ConfigError::InvalidValue("APP_ENV", other.to_string())),
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Platform (Discord) REST configuration
#[derive(Debug, Clone)]
pub struct DiscordConfig {
    pub token: String,
    pub api_base: String,
}

/// Spreadsheet export configuration
#[derive(Debug, Clone)]
pub struct SheetsConfig {
    pub spreadsheet_id: String,
    /// Path to the Google service-account JSON key
    pub credentials_path: String,
    pub api_base: String,
    pub sheet_name: String,
}

/// Shared secret the event relay presents as a bearer token
#[derive(Debug, Clone)]
pub struct RelayConfig {
    pub secret: String,
}

/// Timers and batch sizes for the background tasks
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub export_debounce: Duration,
    pub export_interval: Duration,
    pub export_attempts: u32,
    pub export_backoff: Duration,
    pub sync_interval: Duration,
    pub store_chunk_size: usize,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            export_debounce: Duration::from_secs(5),
            export_interval: Duration::from_secs(5 * 60),
            export_attempts: 3,
            export_backoff: Duration::from_secs(3),
            sync_interval: Duration::from_secs(15 * 60),
            store_chunk_size: 100,
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "roster-sync".to_string()
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_layout_path() -> String {
    "config/roster.toml".to_string()
}

fn default_discord_api() -> String {
    "https://discord.com/api/v10".to_string()
}

fn default_sheets_api() -> String {
    "https://sheets.googleapis.com/v4".to_string()
}

fn default_sheet_name() -> String {
    "Members".to_string()
}

fn required(name: &'static str) -> Result<String, ConfigError> {
    env::var(name)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .ok_or(ConfigError::MissingVar(name))
}

fn parsed_or<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        Err(_) => Ok(default),
    }
}

fn seconds_or(name: &'static str, default: Duration) -> Result<Duration, ConfigError> {
    parsed_or(name, default.as_secs()).map(Duration::from_secs)
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if a required variable is missing or a value does not parse
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        let defaults = ScheduleConfig::default();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: parsed_or("APP_ENV", Environment::default())?,
                layout_path: env::var("ROSTER_LAYOUT_PATH")
                    .unwrap_or_else(|_| default_layout_path()),
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| default_host()),
                port: parsed_or("API_PORT", 8080)?,
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parsed_or("DATABASE_MAX_CONNECTIONS", 10)?,
                min_connections: parsed_or("DATABASE_MIN_CONNECTIONS", 1)?,
            },
            discord: DiscordConfig {
                token: required("DISCORD_TOKEN")?,
                api_base: env::var("DISCORD_API_BASE").unwrap_or_else(|_| default_discord_api()),
            },
            sheets: SheetsConfig {
                spreadsheet_id: required("SHEETS_SPREADSHEET_ID")?,
                credentials_path: required("GOOGLE_CREDENTIALS_PATH")?,
                api_base: env::var("SHEETS_API_BASE").unwrap_or_else(|_| default_sheets_api()),
                sheet_name: env::var("SHEETS_SHEET_NAME").unwrap_or_else(|_| default_sheet_name()),
            },
            relay: RelayConfig {
                secret: required("RELAY_SECRET")?,
            },
            schedule: ScheduleConfig {
                export_debounce: seconds_or("EXPORT_DEBOUNCE_SECS", defaults.export_debounce)?,
                export_interval: seconds_or("EXPORT_INTERVAL_SECS", defaults.export_interval)?,
                export_attempts: parsed_or("EXPORT_ATTEMPTS", defaults.export_attempts)?,
                export_backoff: seconds_or("EXPORT_BACKOFF_SECS", defaults.export_backoff)?,
                sync_interval: seconds_or("SYNC_INTERVAL_SECS", defaults.sync_interval)?,
                store_chunk_size: parsed_or("STORE_CHUNK_SIZE", defaults.store_chunk_size)?,
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),

    #[error("Invalid roster layout: {0}")]
    Layout(String),
}
