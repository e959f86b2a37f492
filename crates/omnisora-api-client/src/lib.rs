//! Shared HTTP client for the OmniSora upload backend.
//!
//! Provides a minimal client with optional X-API-Key auth,
//! generic JSON/multipart POST helpers, the backend endpoints used by the upload
//! flow (`api`), and the direct transfer to the storage provider (`storage`).

pub mod api;
pub mod storage;

use std::time::Duration;

use anyhow::{Context, Result};
use omnisora_core::ClientConfig;
use reqwest::Client;
use serde::de::DeserializeOwned;

pub use storage::StorageClient;

/// Authentication strategy for the API.
#[derive(Clone, Debug)]
pub enum Auth {
    /// `X-API-Key: {key}`
    XApiKey(String),
}

/// Why a request did not produce a usable body.
#[derive(Debug)]
pub(crate) enum ResponseFailure {
    /// The request never got a response (connect error, timeout, reset).
    Transport(String),
    /// Non-2xx status; `body` is the raw response text.
    Status { status: u16, body: String },
    /// 2xx status but the body did not match the expected shape.
    Decode { status: u16, message: String },
}

/// HTTP client for the upload backend.
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
    auth: Option<Auth>,
    config: ClientConfig,
}

impl ApiClient {
    pub fn new(config: ClientConfig, auth: Option<Auth>) -> Result<Self> {
        // Per-request timeouts are set by each call; no client-wide one.
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(10))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
            auth,
            config,
        })
    }

    /// Create client from configuration; `OMNISORA_API_KEY`, when set, is sent as X-API-Key.
    pub fn from_config(config: ClientConfig) -> Result<Self> {
        let auth = config.api_key.clone().map(Auth::XApiKey);
        Self::new(config, auth)
    }

    /// Create client from environment. See [`ClientConfig::from_env`].
    pub fn from_env() -> Result<Self> {
        let config = ClientConfig::from_env().context("Invalid client configuration")?;
        Self::from_config(config)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn build_url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Storage transfer client sharing this client's connection pool.
    pub fn storage_client(&self) -> StorageClient {
        StorageClient::new(self.client.clone(), self.config.clone())
    }

    fn apply_auth(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.auth {
            Some(Auth::XApiKey(key)) => request.header("X-API-Key", key.as_str()),
            None => request,
        }
    }

    /// GET request with query parameters. Deserializes JSON response.
    pub(crate) async fn get<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        timeout: Duration,
    ) -> Result<T, ResponseFailure> {
        let mut request = self.client.get(self.build_url(path)).timeout(timeout);
        request = self.apply_auth(request);
        if !query.is_empty() {
            request = request.query(query);
        }
        send_json(request).await
    }

    /// POST JSON body and deserialize response.
    pub(crate) async fn post_json<T: DeserializeOwned, B: serde::Serialize>(
        &self,
        path: &str,
        body: &B,
        timeout: Duration,
    ) -> Result<T, ResponseFailure> {
        let request = self
            .client
            .post(self.build_url(path))
            .timeout(timeout)
            .json(body);
        let request = self.apply_auth(request);
        send_json(request).await
    }

    /// POST multipart form and deserialize response.
    pub(crate) async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: reqwest::multipart::Form,
        timeout: Duration,
    ) -> Result<T, ResponseFailure> {
        let request = self
            .client
            .post(self.build_url(path))
            .timeout(timeout)
            .multipart(form);
        let request = self.apply_auth(request);
        send_json(request).await
    }
}

/// Send a request; any non-2xx status is a failure regardless of its body.
pub(crate) async fn send_json<T: DeserializeOwned>(
    request: reqwest::RequestBuilder,
) -> Result<T, ResponseFailure> {
    let response = request
        .send()
        .await
        .map_err(|e| ResponseFailure::Transport(describe_transport_error(&e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(ResponseFailure::Status {
            status: status.as_u16(),
            body,
        });
    }

    let bytes = response
        .bytes()
        .await
        .map_err(|e| ResponseFailure::Transport(describe_transport_error(&e)))?;

    serde_json::from_slice(&bytes).map_err(|e| ResponseFailure::Decode {
        status: status.as_u16(),
        message: format!("Failed to parse response as JSON: {}", e),
    })
}

pub(crate) fn describe_transport_error(err: &reqwest::Error) -> String {
    tracing::debug!(error = %err, url = ?err.url().map(|u| u.path()), "HTTP request failed");
    if err.is_timeout() {
        "Request timed out".to_string()
    } else if err.is_connect() {
        "Could not connect to server".to_string()
    } else {
        "Network error occurred".to_string()
    }
}
