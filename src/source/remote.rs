//! HTTP-backed record source.
//!
//! Posts `{"talent_ids": [...]}` to the configured endpoint and expects a
//! JSON array of expert records back.

use crate::error::DashboardError;
use crate::models::ExpertRecord;
use crate::source::RecordSource;
use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::Serialize;
use std::time::Duration;
use tracing::{debug, warn};

#[derive(Debug, Serialize)]
struct FetchRequest<'a> {
    talent_ids: &'a [String],
}

/// Record source backed by a remote HTTP API.
pub struct RemoteSource {
    url: String,
    timeout_seconds: u64,
    http_client: reqwest::Client,
}

impl RemoteSource {
    pub fn new(url: String, timeout_seconds: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_seconds))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            url,
            timeout_seconds,
            http_client,
        })
    }
}

#[async_trait]
impl RecordSource for RemoteSource {
    fn name(&self) -> &'static str {
        "remote"
    }

    async fn fetch(&self, talent_ids: &[String]) -> Result<Vec<ExpertRecord>, DashboardError> {
        debug!("Fetching {} records from {}", talent_ids.len(), self.url);

        let response = self
            .http_client
            .post(&self.url)
            .json(&FetchRequest { talent_ids })
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    DashboardError::Source(format!(
                        "request timed out after {}s",
                        self.timeout_seconds
                    ))
                } else if e.is_connect() {
                    DashboardError::Source(format!("cannot connect to {}", self.url))
                } else {
                    DashboardError::Source(format!("failed to send request: {}", e))
                }
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(DashboardError::Source(format!(
                "remote API error {}: {}",
                status, body
            )));
        }

        let records: Vec<ExpertRecord> = response
            .json()
            .await
            .map_err(|e| DashboardError::Source(format!("failed to parse response: {}", e)))?;

        if records.len() != talent_ids.len() {
            warn!(
                "Remote source returned {} records for {} ids",
                records.len(),
                talent_ids.len()
            );
        }

        Ok(records)
    }
}
