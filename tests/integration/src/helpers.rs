//! Test helpers for integration tests
//!
//! Provides a server bound to an ephemeral port over in-memory ports, plus
//! request and assertion helpers.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use reqwest::{Client, Response, StatusCode};
use roster_api::{create_app, AppState};
use roster_service::testing::{test_engine, FakePlatform, InMemoryRecordStore, RecordingSink};
use roster_service::ServiceContext;
use serde::{de::DeserializeOwned, Serialize};
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// Relay secret every test server is configured with
pub const TEST_SECRET: &str = "integration-relay-secret";

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    pub client: Client,
    pub state: AppState,
    pub store: Arc<InMemoryRecordStore>,
    pub platform: Arc<FakePlatform>,
    pub sink: Arc<RecordingSink>,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server over the sample layout
    pub async fn start() -> Result<Self> {
        let engine = test_engine();
        let state = AppState::new(engine.ctx, TEST_SECRET);
        let app = create_app(state.clone());

        // Port 0 lets the OS pick a free port
        let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            addr,
            client,
            state,
            store: engine.store,
            platform: engine.platform,
            sink: engine.sink,
            _handle: handle,
        })
    }

    /// Get the engine behind the server
    pub fn ctx(&self) -> &ServiceContext {
        self.state.service_context()
    }

    /// Get base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Make a GET request without credentials
    pub async fn get(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).send().await?)
    }

    /// Make a GET request with the relay secret
    pub async fn get_auth(&self, path: &str) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self.client.get(&url).bearer_auth(TEST_SECRET).send().await?)
    }

    /// Make a POST request with a JSON body and the given token
    pub async fn post_with_token<T: Serialize>(
        &self,
        path: &str,
        token: &str,
        body: &T,
    ) -> Result<Response> {
        let url = format!("{}{}", self.base_url(), path);
        Ok(self
            .client
            .post(&url)
            .bearer_auth(token)
            .json(body)
            .send()
            .await?)
    }

    /// Make a POST request with a JSON body and the relay secret
    pub async fn post_auth<T: Serialize>(&self, path: &str, body: &T) -> Result<Response> {
        self.post_with_token(path, TEST_SECRET, body).await
    }
}

/// Assert response status and parse JSON body
pub async fn assert_json<T: DeserializeOwned>(
    response: Response,
    expected_status: StatusCode,
) -> Result<T> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(response.json().await?)
}

/// Assert response status without parsing body
pub async fn assert_status(response: Response, expected_status: StatusCode) -> Result<()> {
    let status = response.status();
    if status != expected_status {
        let body = response.text().await?;
        anyhow::bail!("Expected status {expected_status}, got {status}. Body: {body}");
    }
    Ok(())
}
