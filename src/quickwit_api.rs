//! Quickwit search API client.
//!
//! One authenticated `POST <base>/api/v1/<index>/search` per run. Any
//! transport failure or non-success status is returned as an error carrying
//! the status and response body; nothing is retried.

use crate::credentials::Credentials;
use crate::search::types::{SearchRequest, SearchResponse};
use anyhow::{anyhow, Context, Result};
use log::debug;
use reqwest::header::ACCEPT;
use reqwest::Client;

/// Search endpoint used when neither `--url` nor `QW_URL` is given.
pub const DEFAULT_BASE_URL: &str = "https://quickwit.a.uni.net.th";

/// Index the RADIUS logs are shipped to.
pub const DEFAULT_INDEX: &str = "nro-logs";

/// Quickwit API client configuration
#[derive(Debug, Clone)]
pub struct QuickwitClient {
    base_url: String,
    username: String,
    password: String,
    client: Client,
}

impl QuickwitClient {
    /// Create a new client for a base URL and basic-auth credentials
    pub fn new(base_url: &str, credentials: &Credentials) -> Result<Self> {
        let client = Client::builder()
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            username: credentials.username.clone(),
            password: credentials.password.clone(),
            client,
        })
    }

    /// Create a client, resolving the base URL from the override, then the
    /// credentials file, then the built-in default
    pub fn from_options(url_override: Option<&str>, credentials: &Credentials) -> Result<Self> {
        let base_url = url_override
            .or(credentials.base_url.as_deref())
            .unwrap_or(DEFAULT_BASE_URL);

        Self::new(base_url, credentials)
    }

    /// Full URL of the search endpoint for an index
    pub fn search_url(&self, index: &str) -> String {
        format!("{}/api/v1/{}/search", self.base_url, index)
    }

    /// Run a search request against an index
    pub async fn search(&self, index: &str, request: &SearchRequest) -> Result<SearchResponse> {
        let url = self.search_url(index);
        debug!(
            "POST {} {}",
            url,
            serde_json::to_string(request).unwrap_or_default()
        );

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.username, Some(&self.password))
            .header(ACCEPT, "application/json")
            .json(request)
            .send()
            .await
            .context("Failed to send request to Quickwit")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            return Err(anyhow!(
                "Quickwit search request failed with status {}: {}",
                status,
                body
            ));
        }

        debug!("Quickwit responded {} with {} bytes", status, body.len());

        serde_json::from_str(&body)
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }

    /// Get the base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}
