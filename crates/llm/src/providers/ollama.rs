//! Ollama LLM provider implementation.
//!
//! This module provides integration with Ollama, a local LLM runtime.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use super::{drain_lines, error_from_response, error_from_transport};
use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use crate::types::ChatMessage;
use async_stream::try_stream;
use futures::StreamExt;
use scout_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Ollama chat request format.
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    options: Option<OllamaOptions>,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    num_predict: Option<u32>,
}

/// Ollama chat response format; streaming sends one of these per line.
#[derive(Debug, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    done: bool,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

impl OllamaChatResponse {
    fn usage(&self) -> LlmUsage {
        LlmUsage::new(
            self.prompt_eval_count.unwrap_or(0),
            self.eval_count.unwrap_or(0),
        )
    }

    fn take_content(&mut self) -> String {
        self.message
            .take()
            .map(|m| m.content)
            .unwrap_or_default()
    }
}

/// Ollama LLM client.
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a new Ollama client with default settings.
    ///
    /// Default URL: http://localhost:11434
    pub fn new() -> Self {
        Self::with_base_url(DEFAULT_ENDPOINT)
    }

    /// Create a new Ollama client with a custom base URL.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Apply a request timeout to every call made by this client.
    pub fn with_timeout(mut self, timeout: Duration) -> AppResult<Self> {
        self.client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;
        Ok(self)
    }

    /// Convert LlmRequest to Ollama format.
    fn to_ollama_request<'a>(&self, request: &'a LlmRequest, stream: bool) -> OllamaChatRequest<'a> {
        let options = (request.temperature.is_some() || request.max_tokens.is_some()).then(|| {
            OllamaOptions {
                temperature: request.temperature,
                num_predict: request.max_tokens,
            }
        });

        OllamaChatRequest {
            model: &request.model,
            messages: &request.messages,
            stream,
            options,
        }
    }

    async fn post(&self, body: &OllamaChatRequest<'_>) -> AppResult<reqwest::Response> {
        let url = format!("{}/api/chat", self.base_url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| error_from_transport("Ollama", e))?;

        if !response.status().is_success() {
            return Err(error_from_response("Ollama", response).await);
        }

        Ok(response)
    }
}

impl Default for OllamaClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Parse one NDJSON line of a streaming chat response.
fn parse_stream_line(line: &str) -> AppResult<OllamaChatResponse> {
    let mut parsed: OllamaChatResponse = serde_json::from_str(line)
        .map_err(|e| AppError::Generation(format!("Failed to parse Ollama chunk: {}", e)))?;

    if let Some(error) = parsed.error.take() {
        return Err(AppError::Generation(error));
    }

    Ok(parsed)
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(model = %request.model, "Sending completion request to Ollama");

        let response = self.post(&self.to_ollama_request(request, false)).await?;

        // For non-streaming, Ollama returns a single JSON object
        let mut parsed: OllamaChatResponse = response
            .json()
            .await
            .map_err(|e| AppError::llm(format!("Failed to parse Ollama response: {}", e)))?;

        let usage = parsed.usage();
        let content = parsed.take_content();

        Ok(LlmResponse {
            content,
            model: parsed.model,
            usage,
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        tracing::debug!(model = %request.model, "Starting streaming request to Ollama");

        let response = self.post(&self.to_ollama_request(request, true)).await?;
        let mut bytes = response.bytes_stream();

        Ok(Box::pin(try_stream! {
            let mut buffer: Vec<u8> = Vec::new();
            let mut usage = None;

            'read: while let Some(chunk) = bytes.next().await {
                let chunk = chunk
                    .map_err(|e| AppError::Generation(format!("Stream interrupted: {}", e)))?;
                buffer.extend_from_slice(&chunk);

                for line in drain_lines(&mut buffer) {
                    let mut parsed = parse_stream_line(&line)?;
                    let content = parsed.take_content();
                    if !content.is_empty() {
                        yield LlmStreamChunk::text(content);
                    }
                    if parsed.done {
                        usage = Some(parsed.usage());
                        break 'read;
                    }
                }
            }

            // Connection closed without a done marker
            let usage = usage
                .ok_or_else(|| AppError::Generation("Ollama stream ended unexpectedly".to_string()))?;
            yield LlmStreamChunk::finished(Some(usage));
        }))
    }
}
