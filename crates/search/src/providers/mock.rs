//! Offline search provider returning scripted results.

use crate::provider::SearchProvider;
use crate::types::{SearchOptions, SearchResult};
use scout_core::{AppError, AppResult};
use std::sync::Mutex;
use std::time::Duration;

/// Mock search provider.
///
/// Returns the configured results (truncated to the requested limit) for
/// every query and records the queries it received.
pub struct MockSearch {
    results: Vec<SearchResult>,
    failure: Option<(Option<u16>, String)>,
    delay: Option<Duration>,
    queries: Mutex<Vec<String>>,
}

impl MockSearch {
    pub fn new() -> Self {
        Self::with_results(default_results())
    }

    pub fn with_results(results: Vec<SearchResult>) -> Self {
        Self {
            results,
            failure: None,
            delay: None,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Fail every search with the given status.
    pub fn failing(mut self, status: Option<u16>, message: impl Into<String>) -> Self {
        self.failure = Some((status, message.into()));
        self
    }

    /// Wait before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Queries received so far.
    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

impl Default for MockSearch {
    fn default() -> Self {
        Self::new()
    }
}

fn default_results() -> Vec<SearchResult> {
    vec![
        SearchResult::new(
            "https://example.com/overview",
            "Overview",
            "An overview page used when Scout runs without a live search provider. \
             It stands in for the most relevant result of a real search.",
        ),
        SearchResult::new(
            "https://example.org/details",
            "Details",
            "A second offline page with supporting details for the answer.",
        ),
        SearchResult::new(
            "https://example.net/background",
            "Background",
            "A third offline page with background material.",
        ),
    ]
}

#[async_trait::async_trait]
impl SearchProvider for MockSearch {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn search(&self, query: &str, options: &SearchOptions) -> AppResult<Vec<SearchResult>> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if let Some((status, message)) = &self.failure {
            return Err(AppError::Search {
                status: *status,
                message: message.clone(),
            });
        }

        Ok(self
            .results
            .iter()
            .take(options.limit as usize)
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_returns_results_up_to_limit() {
        let search = MockSearch::new();
        let results = search
            .search("anything", &SearchOptions::with_limit(2))
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(search.queries(), vec!["anything".to_string()]);
    }

    #[tokio::test]
    async fn test_scripted_failure() {
        let search = MockSearch::new().failing(Some(402), "Payment required");
        let err = search
            .search("q", &SearchOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.status_code(), Some(402));
    }
}
