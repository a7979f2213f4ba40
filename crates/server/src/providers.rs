//! Where a request's providers come from.

use scout_core::{AppConfig, AppResult};
use scout_llm::{create_client, LlmClient};
use scout_search::{create_search_provider, SearchProvider};
use std::sync::Arc;
use std::time::Duration;

/// Supplies the providers for one request.
///
/// A caller-supplied key takes precedence over the server-side default.
pub trait ProviderSource: Send + Sync {
    fn search(&self, caller_key: Option<&str>) -> AppResult<Arc<dyn SearchProvider>>;

    fn generation(&self, caller_key: Option<&str>) -> AppResult<Arc<dyn LlmClient>>;
}

/// Builds providers from the application configuration.
pub struct ConfiguredProviders {
    config: Arc<AppConfig>,
}

impl ConfiguredProviders {
    pub fn new(config: Arc<AppConfig>) -> Self {
        Self { config }
    }
}

impl ProviderSource for ConfiguredProviders {
    fn search(&self, caller_key: Option<&str>) -> AppResult<Arc<dyn SearchProvider>> {
        let search = &self.config.search;
        let key = self.config.resolve_search_key(caller_key)?;

        create_search_provider(
            &search.provider,
            search.endpoint.as_deref(),
            key.as_deref(),
            Some(Duration::from_secs(search.timeout_secs)),
        )
    }

    fn generation(&self, caller_key: Option<&str>) -> AppResult<Arc<dyn LlmClient>> {
        let key = self.config.resolve_generation_key(caller_key)?;

        create_client(
            &self.config.provider,
            self.config.generation_endpoint(),
            key.as_deref(),
            Some(self.config.generation_timeout()),
        )
    }
}
