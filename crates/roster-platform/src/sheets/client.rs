//! Spreadsheet export sink (Google Sheets v4 REST)
//!
//! Each export clears every data row, then writes the header plus all rows
//! starting at A1, so stale rows from a longer previous export never linger.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Serialize;
use tracing::{info, instrument};

use roster_common::SheetsConfig;
use roster_core::entities::{ExportRow, EXPORT_HEADERS};
use roster_core::traits::{ExportSink, RepoResult};

use crate::error::{error_from_response, PlatformError};

use super::token::{GoogleTokenProvider, ServiceAccountKey};

/// Last column letter of the export (one column per header)
const LAST_COLUMN: char = (b'A' + EXPORT_HEADERS.len() as u8 - 1) as char;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ValueRange<'a> {
    range: &'a str,
    major_dimension: &'static str,
    values: Vec<Vec<String>>,
}

/// Export sink writing the roster to one sheet of a spreadsheet
pub struct SheetsSink {
    http: Client,
    api_base: String,
    spreadsheet_id: String,
    sheet_name: String,
    tokens: GoogleTokenProvider,
}

impl SheetsSink {
    /// Create a sink from configuration, loading the service-account key
    pub fn new(config: &SheetsConfig) -> Result<Self, PlatformError> {
        let http = Client::builder().timeout(Duration::from_secs(30)).build()?;
        let key = ServiceAccountKey::from_file(&config.credentials_path)?;
        let tokens = GoogleTokenProvider::new(http.clone(), key)?;

        Ok(Self {
            http,
            api_base: config.api_base.trim_end_matches('/').to_string(),
            spreadsheet_id: config.spreadsheet_id.clone(),
            sheet_name: config.sheet_name.clone(),
            tokens,
        })
    }

    /// Data rows only (everything below the header)
    pub fn clear_range(&self) -> String {
        sheet_range(&self.sheet_name, 2)
    }

    /// Header plus data rows
    pub fn write_range(&self) -> String {
        sheet_range(&self.sheet_name, 1)
    }

    fn values_url(&self, range_segment: &str) -> Result<Url, PlatformError> {
        let mut url = Url::parse(&format!(
            "{}/spreadsheets/{}/values",
            self.api_base, self.spreadsheet_id
        ))
        .map_err(|e| PlatformError::Url(e.to_string()))?;

        url.path_segments_mut()
            .map_err(|()| PlatformError::Url(self.api_base.clone()))?
            .push(range_segment);
        Ok(url)
    }

    async fn clear(&self, token: &str) -> Result<(), PlatformError> {
        let url = self.values_url(&format!("{}:clear", self.clear_range()))?;
        let response = self
            .http
            .post(url)
            .bearer_auth(token)
            .json(&serde_json::json!({}))
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }

    async fn write(&self, token: &str, rows: &[ExportRow]) -> Result<(), PlatformError> {
        let range = self.write_range();
        let url = self.values_url(&range)?;
        let body = ValueRange {
            range: &range,
            major_dimension: "ROWS",
            values: sheet_values(rows),
        };

        let response = self
            .http
            .put(url)
            .bearer_auth(token)
            .query(&[("valueInputOption", "RAW")])
            .json(&body)
            .send()
            .await?;

        if response.status().is_success() {
            Ok(())
        } else {
            Err(error_from_response(response).await)
        }
    }
}

/// A1 range covering every export column from `first_row` down
fn sheet_range(sheet_name: &str, first_row: u32) -> String {
    let sheet = if sheet_name.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        sheet_name.to_string()
    } else {
        format!("'{}'", sheet_name.replace('\'', "''"))
    };
    format!("{sheet}!A{first_row}:{LAST_COLUMN}")
}

/// Header row followed by every data row
fn sheet_values(rows: &[ExportRow]) -> Vec<Vec<String>> {
    std::iter::once(ExportRow::header())
        .chain(rows.iter().cloned())
        .map(ExportRow::into_cells)
        .collect()
}

#[async_trait]
impl ExportSink for SheetsSink {
    #[instrument(skip(self, rows), fields(rows = rows.len()))]
    async fn replace_all(&self, rows: &[ExportRow]) -> RepoResult<()> {
        let token = self
            .tokens
            .access_token()
            .await
            .map_err(PlatformError::into_sink)?;

        self.clear(&token).await.map_err(PlatformError::into_sink)?;
        self.write(&token, rows)
            .await
            .map_err(PlatformError::into_sink)?;

        info!(rows = rows.len(), "Exported roster to spreadsheet");
        Ok(())
    }
}
