//! Firecrawl search provider.
//!
//! Firecrawl searches the web and scrapes each hit in one call.
//! API: https://docs.firecrawl.dev/api-reference/endpoint/search

use crate::provider::SearchProvider;
use crate::types::{SearchOptions, SearchResult};
use scout_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.firecrawl.dev";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct FirecrawlSearchRequest<'a> {
    query: &'a str,
    limit: u32,
    scrape_options: ScrapeOptions<'a>,
}

#[derive(Debug, Serialize)]
struct ScrapeOptions<'a> {
    formats: &'a [String],
}

#[derive(Debug, Deserialize)]
struct FirecrawlSearchResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    data: Vec<SearchResult>,
    #[serde(default)]
    error: Option<String>,
}

/// Firecrawl API client.
pub struct FirecrawlClient {
    endpoint: String,
    api_key: String,
    client: reqwest::Client,
}

impl FirecrawlClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_key: api_key.into(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the client at a self-hosted instance.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> AppResult<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    fn transport_error(err: reqwest::Error) -> AppError {
        let status = if err.is_timeout() {
            Some(504)
        } else {
            err.status().map(|s| s.as_u16())
        };
        AppError::Search {
            status,
            message: format!("Failed to reach Firecrawl: {}", err),
        }
    }
}

/// Pull a readable message out of a Firecrawl error body.
fn error_message(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(str::to_string))
        .unwrap_or_else(|| body.trim().to_string())
}

#[async_trait::async_trait]
impl SearchProvider for FirecrawlClient {
    fn provider_name(&self) -> &str {
        "firecrawl"
    }

    async fn search(&self, query: &str, options: &SearchOptions) -> AppResult<Vec<SearchResult>> {
        let url = format!("{}/v1/search", self.endpoint);
        let body = FirecrawlSearchRequest {
            query,
            limit: options.limit,
            scrape_options: ScrapeOptions {
                formats: &options.formats,
            },
        };

        tracing::info!(limit = options.limit, "Searching with Firecrawl");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(Self::transport_error)?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(AppError::Search {
                status: Some(status.as_u16()),
                message: error_message(&text),
            });
        }

        let parsed: FirecrawlSearchResponse = response
            .json()
            .await
            .map_err(|e| AppError::search(format!("Failed to parse Firecrawl response: {}", e)))?;

        if !parsed.success {
            return Err(AppError::search(
                parsed
                    .error
                    .unwrap_or_else(|| "Firecrawl reported an unsuccessful search".to_string()),
            ));
        }

        tracing::info!(results = parsed.data.len(), "Firecrawl search finished");

        Ok(parsed.data)
    }
}
