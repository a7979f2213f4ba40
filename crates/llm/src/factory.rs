//! LLM provider factory.
//!
//! This module creates generation clients from a provider name, an optional
//! endpoint override, and an already-resolved API key.

use crate::client::LlmClient;
use crate::providers::{ollama, openai, MockClient, OllamaClient, OpenAiClient};
use crate::types::ProviderType;
use scout_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client based on the provider name.
///
/// # Arguments
/// * `provider` - Provider identifier ("openai", "groq", "ollama", "mock")
/// * `endpoint` - Optional custom endpoint URL
/// * `api_key` - API key, required by OpenAI-compatible providers
/// * `timeout` - Optional per-request timeout
///
/// # Errors
/// Returns error if the provider is unknown or a required key is missing.
pub fn create_client(
    provider: &str,
    endpoint: Option<&str>,
    api_key: Option<&str>,
    timeout: Option<Duration>,
) -> AppResult<Arc<dyn LlmClient>> {
    let provider_type = ProviderType::parse(provider)
        .ok_or_else(|| AppError::Config(format!("Unknown provider: {}", provider)))?;

    tracing::debug!(provider = provider_type.as_str(), ?endpoint, "Creating LLM client");

    match provider_type {
        ProviderType::Ollama => {
            let mut client =
                OllamaClient::with_base_url(endpoint.unwrap_or(ollama::DEFAULT_ENDPOINT));
            if let Some(timeout) = timeout {
                client = client.with_timeout(timeout)?;
            }
            Ok(Arc::new(client))
        }
        ProviderType::OpenAI => {
            let key = api_key
                .filter(|k| !k.trim().is_empty())
                .ok_or(AppError::MissingGenerationCredential)?;
            let mut client = OpenAiClient::with_base_url(
                endpoint.unwrap_or(openai::DEFAULT_ENDPOINT),
                key,
            );
            if let Some(timeout) = timeout {
                client = client.with_timeout(timeout)?;
            }
            Ok(Arc::new(client))
        }
        ProviderType::Mock => Ok(Arc::new(MockClient::new())),
    }
}
