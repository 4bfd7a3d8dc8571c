//! HTTP client for the Workboard document store.
//!
//! The base URL comes from `WORKBOARD_URL` via [`crate::config::Config`]
//! (default: `http://localhost:3000/api`).

use reqwest::Client;
use thiserror::Error;

use crate::models::Document;

/// Default URL for a locally running `workboard serve`.
pub const DEFAULT_URL: &str = "http://localhost:3000/api";

/// HTTP client errors.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Server error: {0}")]
    Server(String),
}

/// Loads and saves the whole board document.
#[derive(Debug, Clone)]
pub struct DocumentClient {
    base_url: String,
    client: Client,
}

impl DocumentClient {
    /// Create a client for the store at `base_url`.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: Client::new(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn data_url(&self) -> String {
        format!("{}/data", self.base_url)
    }

    /// Fetch the current document, surfacing every failure.
    pub async fn try_load(&self) -> Result<Document, ClientError> {
        let response = self.client.get(self.data_url()).send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(ClientError::Server(format!("{}: {}", status, body)));
        }
        let mut document: Document = response.json().await?;
        let assigned = document.assign_missing_ids();
        if assigned > 0 {
            tracing::debug!("Assigned ids to {} legacy subtask(s)", assigned);
        }
        Ok(document)
    }

    /// Fetch the current document. Any failure (unreachable server, non-success
    /// status, body that is not a board document) yields the empty document.
    pub async fn load(&self) -> Document {
        match self.try_load().await {
            Ok(document) => document,
            Err(e) => {
                tracing::warn!("Failed to load data from {}: {}", self.base_url, e);
                Document::empty()
            }
        }
    }

    /// Persist the full document. No retry and nothing to roll back on failure.
    pub async fn save(&self, document: &Document) -> Result<(), ClientError> {
        let response = self
            .client
            .post(self.data_url())
            .json(document)
            .send()
            .await?;
        let status = response.status();
        if status.is_success() {
            tracing::debug!("Saved document to {}", self.base_url);
            Ok(())
        } else {
            let body = response.text().await.unwrap_or_default();
            Err(ClientError::Server(format!("{}: {}", status, body)))
        }
    }
}
