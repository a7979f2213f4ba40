//! Search provider trait and factory.

use crate::providers::{FirecrawlClient, MockSearch};
use crate::types::{SearchOptions, SearchResult};
use scout_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Trait for web search providers.
///
/// Implementations report HTTP failures as
/// `AppError::Search { status: Some(code), .. }`.
#[async_trait::async_trait]
pub trait SearchProvider: Send + Sync {
    /// Get provider name (e.g., "firecrawl", "mock")
    fn provider_name(&self) -> &str;

    /// Run a search and return raw results in provider rank order.
    async fn search(&self, query: &str, options: &SearchOptions) -> AppResult<Vec<SearchResult>>;
}

/// Create a search provider by name.
pub fn create_search_provider(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Option<Duration>,
) -> AppResult<Arc<dyn SearchProvider>> {
    match provider.to_lowercase().as_str() {
        "firecrawl" => {
            let key = api_key
                .filter(|k| !k.trim().is_empty())
                .ok_or(AppError::MissingSearchCredential)?;
            let mut client = FirecrawlClient::new(key);
            if let Some(endpoint) = endpoint {
                client = client.with_endpoint(endpoint);
            }
            if let Some(timeout) = timeout {
                client = client.with_timeout(timeout)?;
            }
            Ok(Arc::new(client))
        }

        "mock" => Ok(Arc::new(MockSearch::new())),

        _ => Err(AppError::Config(format!(
            "Unknown search provider: '{}'. Supported providers: firecrawl, mock",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_mock_provider() {
        let provider = create_search_provider("mock", None, None, None).unwrap();
        assert_eq!(provider.provider_name(), "mock");
    }

    #[test]
    fn test_firecrawl_requires_key() {
        let result = create_search_provider("firecrawl", None, None, None);
        assert!(matches!(result, Err(AppError::MissingSearchCredential)));

        let provider = create_search_provider(
            "Firecrawl",
            Some("http://localhost:3002"),
            Some("fc-test"),
            Some(Duration::from_secs(5)),
        )
        .unwrap();
        assert_eq!(provider.provider_name(), "firecrawl");
    }

    #[test]
    fn test_create_unknown_provider() {
        let result = create_search_provider("bing", None, None, None);
        assert!(result
            .err()
            .map(|e| e.to_string().contains("Unknown search provider"))
            .unwrap_or(false));
    }
}
