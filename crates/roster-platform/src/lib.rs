//! # roster-platform
//!
//! Outbound adapters for the roster engine's external collaborators:
//!
//! - [`DiscordClient`] implements `MemberPlatform` over the platform REST API
//! - [`SheetsSink`] implements `ExportSink` over the spreadsheet REST API,
//!   authenticated with a service-account JWT

pub mod discord;
pub mod error;
pub mod sheets;

pub use discord::DiscordClient;
pub use error::PlatformError;
pub use sheets::{GoogleTokenProvider, ServiceAccountKey, SheetsSink};
