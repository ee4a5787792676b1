//! HTTP client for the Airtable-style record API.
//!
//! `AirtableClient` implements [`RecordSource`] over the REST API, following
//! `offset` pagination for list reads.

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client, Url};
use serde::{de::DeserializeOwned, Deserialize};
use tracing::debug;

use super::source::{RawRecord, RecordSource, SelectQuery};
use super::ApiError;

// ============================================================================
// Constants
// ============================================================================

/// Default API host
pub const DEFAULT_BASE_URL: &str = "https://api.airtable.com";

/// HTTP request timeout in seconds.
const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Largest page the API will return.
const MAX_PAGE_SIZE: usize = 100;

#[derive(Debug, Deserialize)]
struct ListResponse {
    records: Vec<RawRecord>,
    offset: Option<String>,
}

/// Record API client.
/// Clone is cheap - reqwest::Client uses Arc internally for connection pooling.
#[derive(Clone)]
pub struct AirtableClient {
    client: Client,
    base_url: Url,
    base_id: String,
    api_key: String,
}

impl AirtableClient {
    pub fn new(base_url: &str, base_id: &str, api_key: &str) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()?;
        let base_url = Url::parse(base_url)
            .with_context(|| format!("Invalid record API base URL: {}", base_url))?;

        Ok(Self {
            client,
            base_url,
            base_id: base_id.to_string(),
            api_key: api_key.to_string(),
        })
    }

    /// Build `{base}/v0/{base_id}/{table}[/{id}]` with each segment escaped.
    fn table_url(&self, table: &str, id: Option<&str>) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| anyhow!("Record API base URL cannot have a path"))?;
            segments.pop_if_empty().extend(["v0", self.base_id.as_str(), table]);
            if let Some(id) = id {
                segments.push(id);
            }
        }
        Ok(url)
    }

    /// Check if response is successful, returning an error with body if not.
    async fn check_response(response: reqwest::Response) -> Result<reqwest::Response> {
        if response.status().is_success() {
            Ok(response)
        } else {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            Err(ApiError::from_status(status, &body).into())
        }
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, params: &[(&str, String)]) -> Result<T> {
        let response = self
            .client
            .get(url.clone())
            .header(header::ACCEPT, "application/json")
            .bearer_auth(&self.api_key)
            .query(params)
            .send()
            .await
            .map_err(ApiError::from)
            .with_context(|| format!("Failed to send GET request to {}", url))?;

        let response = Self::check_response(response).await?;
        response
            .json()
            .await
            .with_context(|| format!("Failed to parse JSON response from {}", url))
    }
}

/// Query parameters for one page of a list read.
fn page_params(
    query: &SelectQuery,
    fetched: usize,
    offset: Option<&str>,
) -> Vec<(&'static str, String)> {
    let mut params = Vec::with_capacity(4);
    if !query.filter_formula.is_empty() {
        params.push(("filterByFormula", query.filter_formula.clone()));
    }
    let page_size = match query.max_records {
        Some(max) => {
            params.push(("maxRecords", max.to_string()));
            max.saturating_sub(fetched).clamp(1, MAX_PAGE_SIZE)
        }
        None => MAX_PAGE_SIZE,
    };
    params.push(("pageSize", page_size.to_string()));
    if let Some(offset) = offset {
        params.push(("offset", offset.to_string()));
    }
    params
}

#[async_trait]
impl RecordSource for AirtableClient {
    async fn select(&self, table: &str, query: &SelectQuery) -> Result<Vec<RawRecord>> {
        let url = self.table_url(table, None)?;
        let mut records = Vec::new();
        let mut offset: Option<String> = None;

        loop {
            let params = page_params(query, records.len(), offset.as_deref());
            let page: ListResponse = self.get(url.clone(), &params).await?;
            debug!(table = table, page_len = page.records.len(), "Fetched record page");
            records.extend(page.records);

            if let Some(max) = query.max_records {
                if records.len() >= max {
                    records.truncate(max);
                    break;
                }
            }
            match page.offset {
                Some(next) => offset = Some(next),
                None => break,
            }
        }

        Ok(records)
    }

    async fn find(&self, table: &str, id: &str) -> Result<RawRecord> {
        let url = self.table_url(table, Some(id))?;
        self.get(url, &[]).await
    }
}
