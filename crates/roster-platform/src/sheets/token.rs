//! Google service-account access tokens
//!
//! Signs an RS256 JWT assertion with the service account's private key and
//! exchanges it at the key's `token_uri` for a short-lived bearer token.
//! Tokens are cached until shortly before they expire.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use parking_lot::Mutex;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{error_from_response, PlatformError};

/// OAuth scope for reading and writing spreadsheets
pub const SHEETS_SCOPE: &str = "https://www.googleapis.com/auth/spreadsheets";

const JWT_BEARER_GRANT: &str = "urn:ietf:params:oauth:grant-type:jwt-bearer";
/// Lifetime requested for each assertion (Google's maximum)
const ASSERTION_LIFETIME_SECS: i64 = 3600;
/// Refresh cached tokens this long before they expire
const REFRESH_MARGIN_SECS: i64 = 60;

/// The fields of a service-account key file this provider needs
#[derive(Debug, Clone, Deserialize)]
pub struct ServiceAccountKey {
    pub client_email: String,
    pub private_key: String,
    #[serde(default = "default_token_uri")]
    pub token_uri: String,
}

fn default_token_uri() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

impl ServiceAccountKey {
    /// Read a key file from disk
    pub fn from_file(path: &str) -> Result<Self, PlatformError> {
        let raw = std::fs::read_to_string(path)
            .map_err(|e| PlatformError::Credentials(format!("{path}: {e}")))?;
        Self::from_json(&raw)
    }

    /// Parse a key from its JSON text
    pub fn from_json(raw: &str) -> Result<Self, PlatformError> {
        serde_json::from_str(raw).map_err(|e| PlatformError::Credentials(e.to_string()))
    }
}

#[derive(Debug, Serialize)]
struct AssertionClaims<'a> {
    iss: &'a str,
    scope: &'a str,
    aud: &'a str,
    iat: i64,
    exp: i64,
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: i64,
}

#[derive(Debug, Clone)]
struct CachedToken {
    value: String,
    expires_at: DateTime<Utc>,
}

impl CachedToken {
    fn is_fresh(&self, now: DateTime<Utc>) -> bool {
        now + Duration::seconds(REFRESH_MARGIN_SECS) < self.expires_at
    }
}

/// Mints and caches access tokens for one service account
pub struct GoogleTokenProvider {
    http: Client,
    key: ServiceAccountKey,
    encoding_key: EncodingKey,
    cached: Mutex<Option<CachedToken>>,
}

impl GoogleTokenProvider {
    /// Create a provider, validating the private key up front
    pub fn new(http: Client, key: ServiceAccountKey) -> Result<Self, PlatformError> {
        let encoding_key = EncodingKey::from_rsa_pem(key.private_key.as_bytes())
            .map_err(|e| PlatformError::Credentials(e.to_string()))?;

        Ok(Self {
            http,
            key,
            encoding_key,
            cached: Mutex::new(None),
        })
    }

    /// Return a valid access token, minting a new one if needed
    pub async fn access_token(&self) -> Result<String, PlatformError> {
        let now = Utc::now();
        let cached = self.cached.lock().clone().filter(|t| t.is_fresh(now));
        if let Some(token) = cached {
            return Ok(token.value);
        }

        let assertion = self.sign_assertion(now)?;
        let response = self
            .http
            .post(&self.key.token_uri)
            .form(&[("grant_type", JWT_BEARER_GRANT), ("assertion", assertion.as_str())])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let token: TokenResponse = response.json().await?;
        let cached = CachedToken {
            value: token.access_token,
            expires_at: now + Duration::seconds(token.expires_in),
        };
        debug!(expires_at = %cached.expires_at, "Minted spreadsheet access token");

        let value = cached.value.clone();
        *self.cached.lock() = Some(cached);
        Ok(value)
    }

    fn sign_assertion(&self, now: DateTime<Utc>) -> Result<String, PlatformError> {
        let claims = AssertionClaims {
            iss: &self.key.client_email,
            scope: SHEETS_SCOPE,
            aud: &self.key.token_uri,
            iat: now.timestamp(),
            exp: now.timestamp() + ASSERTION_LIFETIME_SECS,
        };

        jsonwebtoken::encode(&Header::new(Algorithm::RS256), &claims, &self.encoding_key)
            .map_err(|e| PlatformError::Jwt(e.to_string()))
    }
}
