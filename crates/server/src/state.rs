//! Shared server state.

use crate::providers::{ConfiguredProviders, ProviderSource};
use scout_answer::{TurnSequence, TurnSettings};
use scout_core::{AppConfig, AppResult};
use scout_prompt::PromptLibrary;
use std::sync::Arc;

/// State shared by every request.
///
/// Nothing here is mutated per turn except the turn counter.
#[derive(Clone)]
pub struct AppState {
    pub providers: Arc<dyn ProviderSource>,
    pub prompts: Arc<PromptLibrary>,
    pub settings: TurnSettings,
    pub turns: Arc<TurnSequence>,
    pub allowed_origins: Vec<String>,
}

impl AppState {
    pub fn new(
        providers: Arc<dyn ProviderSource>,
        prompts: PromptLibrary,
        settings: TurnSettings,
    ) -> Self {
        Self {
            providers,
            prompts: Arc::new(prompts),
            settings,
            turns: Arc::new(TurnSequence::new()),
            allowed_origins: Vec::new(),
        }
    }

    /// Validate the configuration and load prompts from the workspace.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        config.validate()?;

        let prompts = PromptLibrary::load(&config.workspace)?;
        let providers = Arc::new(ConfiguredProviders::new(Arc::new(config.clone())));

        let mut state = Self::new(providers, prompts, TurnSettings::from_config(config));
        state.allowed_origins = config.server.allowed_origins.clone();
        Ok(state)
    }
}
