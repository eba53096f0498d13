//! Spreadsheet export adapter

mod client;
mod token;

pub use client::SheetsSink;
pub use token::{GoogleTokenProvider, ServiceAccountKey, SHEETS_SCOPE};
