//! Authenticated HTTP transport for the inventory API.
//!
//! One request per call. Non-success statuses come back as
//! [`StoreError::Status`] with the response body; connection failures and
//! timeouts as [`StoreError::Transport`]. Nothing is retried here.

use std::time::Duration;

use anyhow::Context;
use reqwest::header::{self, HeaderMap, HeaderValue};
use reqwest::{Client, Method, RequestBuilder, StatusCode};
use serde::Serialize;
use tgsync_common::StoreError;
use tgsync_protocols::QueryPairs;
use tracing::debug;

pub const DEFAULT_BASE_URL: &str = "https://cloud.tenable.com";
pub const DEFAULT_AGENT_MANAGER: &str = "US Cloud Scanner";
const DEFAULT_TIMEOUT_SECS: u64 = 60;

#[derive(Debug, Clone)]
pub struct ApiSettings {
    pub base_url: String,
    pub access_key: String,
    pub secret_key: String,
    pub timeout: Duration,
    /// Substring identifying the scanner that manages agents.
    pub agent_manager: String,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            access_key: String::new(),
            secret_key: String::new(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            agent_manager: DEFAULT_AGENT_MANAGER.to_string(),
        }
    }
}

pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(settings: &ApiSettings) -> anyhow::Result<Self> {
        let mut keys = HeaderValue::from_str(&format!(
            "accessKey={};secretKey={}",
            settings.access_key, settings.secret_key
        ))
        .context("API keys contain characters not allowed in a header")?;
        keys.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert("X-ApiKeys", keys);
        headers.insert(header::ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(settings.timeout)
            .user_agent(format!("tgsync/{}", env!("CARGO_PKG_VERSION")))
            .default_headers(headers)
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{path}", self.base_url)
    }

    pub async fn get(&self, path: &str, query: &QueryPairs) -> Result<Vec<u8>, StoreError> {
        let request = self.client.get(self.url(path)).query(query);
        self.execute(request, StatusCode::OK).await
    }

    /// POST or PUT a JSON body.
    pub async fn send_json<B: Serialize + ?Sized>(
        &self,
        method: Method,
        path: &str,
        body: &B,
    ) -> Result<Vec<u8>, StoreError> {
        let request = self.client.request(method, self.url(path)).json(body);
        self.execute(request, StatusCode::OK).await
    }

    /// Deletion is asynchronous on the server and answers `202 Accepted`.
    pub async fn delete(&self, path: &str) -> Result<(), StoreError> {
        let request = self.client.delete(self.url(path));
        self.execute(request, StatusCode::ACCEPTED).await.map(|_| ())
    }

    async fn execute(
        &self,
        request: RequestBuilder,
        expected: StatusCode,
    ) -> Result<Vec<u8>, StoreError> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        debug!("{} {}", status.as_u16(), response.url().path());

        let body = response.bytes().await.map_err(transport)?;
        if status != expected {
            return Err(StoreError::Status {
                status: status.as_u16(),
                body: String::from_utf8_lossy(&body).into_owned(),
            });
        }
        Ok(body.to_vec())
    }
}

fn transport(e: reqwest::Error) -> StoreError {
    if e.is_timeout() {
        StoreError::Transport(format!("request timed out: {e}"))
    } else {
        StoreError::Transport(e.to_string())
    }
}

// ╔════════════════════════════════════════════╗
// ║ ████████╗███████╗███████╗████████╗███████╗ ║
// ║ ╚══██╔══╝██╔════╝██╔════╝╚══██╔══╝██╔════╝ ║
// ║    ██║   █████╗  ███████╗   ██║   ███████╗ ║
// ║    ██║   ██╔══╝  ╚════██║   ██║   ╚════██║ ║
// ║    ██║   ███████╗███████║   ██║   ███████║ ║
// ║    ╚═╝   ╚══════╝╚══════╝   ╚═╝   ╚══════╝ ║
// ╚════════════════════════════════════════════╝
