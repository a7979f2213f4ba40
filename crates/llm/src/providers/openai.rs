//! OpenAI-compatible chat completions provider.
//!
//! Works against any endpoint speaking the `/chat/completions` wire format
//! (OpenAI, Groq, vLLM, llama.cpp server). Streaming responses arrive as
//! server-sent events terminated by `data: [DONE]`.

use super::{drain_lines, error_from_response, error_from_transport, extract_error_message};
use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use crate::types::ChatMessage;
use async_stream::try_stream;
use futures::StreamExt;
use scout_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_ENDPOINT: &str = "https://api.openai.com/v1";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct StreamEvent {
    #[serde(default)]
    choices: Vec<StreamChoice>,
    #[serde(default)]
    usage: Option<UsagePayload>,
}

#[derive(Debug, Deserialize)]
struct StreamChoice {
    #[serde(default)]
    delta: Delta,
}

#[derive(Debug, Default, Deserialize)]
struct Delta {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct UsagePayload {
    #[serde(default)]
    prompt_tokens: u32,
    #[serde(default)]
    completion_tokens: u32,
}

impl From<UsagePayload> for LlmUsage {
    fn from(usage: UsagePayload) -> Self {
        LlmUsage::new(usage.prompt_tokens, usage.completion_tokens)
    }
}

/// One parsed server-sent event line.
#[derive(Debug, PartialEq)]
enum SseLine {
    Text(String),
    Usage(LlmUsage),
    Done,
    Skip,
}

/// Interpret one SSE line. Error payloads sent mid-stream surface as
/// `AppError::Generation`.
fn parse_sse_line(line: &str) -> AppResult<SseLine> {
    let Some(data) = line.strip_prefix("data:") else {
        return Ok(SseLine::Skip);
    };
    let data = data.trim();

    if data == "[DONE]" {
        return Ok(SseLine::Done);
    }

    let value: serde_json::Value = serde_json::from_str(data)
        .map_err(|e| AppError::Generation(format!("Malformed stream event: {}", e)))?;

    if value.get("error").is_some() {
        return Err(AppError::Generation(extract_error_message(data)));
    }

    let event: StreamEvent = serde_json::from_value(value)
        .map_err(|e| AppError::Generation(format!("Malformed stream event: {}", e)))?;

    if let Some(text) = event
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.delta.content)
        .filter(|t| !t.is_empty())
    {
        return Ok(SseLine::Text(text));
    }

    Ok(event.usage.map(|u| SseLine::Usage(u.into())).unwrap_or(SseLine::Skip))
}

/// Client for OpenAI-compatible endpoints.
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    client: reqwest::Client,
}

impl OpenAiClient {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self::with_base_url(DEFAULT_ENDPOINT, api_key)
    }

    pub fn with_base_url(base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
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

    fn to_wire<'a>(&self, request: &'a LlmRequest, stream: bool) -> ChatCompletionRequest<'a> {
        ChatCompletionRequest {
            model: &request.model,
            messages: &request.messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream,
        }
    }

    async fn post(&self, body: &ChatCompletionRequest<'_>) -> AppResult<reqwest::Response> {
        let url = format!("{}/chat/completions", self.base_url);

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(body)
            .send()
            .await
            .map_err(|e| error_from_transport("OpenAI", e))?;

        if !response.status().is_success() {
            return Err(error_from_response("OpenAI", response).await);
        }

        Ok(response)
    }
}

#[async_trait::async_trait]
impl LlmClient for OpenAiClient {
    fn provider_name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        tracing::debug!(model = %request.model, messages = request.messages.len(), "OpenAI completion");

        let response = self.post(&self.to_wire(request, false)).await?;
        let parsed: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| AppError::llm(format!("Failed to parse OpenAI response: {}", e)))?;

        let content = parsed
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .unwrap_or_default();

        Ok(LlmResponse {
            content,
            model: if parsed.model.is_empty() {
                request.model.clone()
            } else {
                parsed.model
            },
            usage: parsed.usage.map(Into::into).unwrap_or_default(),
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        tracing::debug!(model = %request.model, messages = request.messages.len(), "OpenAI stream");

        let response = self.post(&self.to_wire(request, true)).await?;
        let mut bytes = response.bytes_stream();

        Ok(Box::pin(try_stream! {
            let mut buffer: Vec<u8> = Vec::new();
            let mut usage = None;

            'read: while let Some(chunk) = bytes.next().await {
                let chunk = chunk
                    .map_err(|e| AppError::Generation(format!("Stream interrupted: {}", e)))?;
                buffer.extend_from_slice(&chunk);

                for line in drain_lines(&mut buffer) {
                    match parse_sse_line(&line)? {
                        SseLine::Text(text) => {
                            yield LlmStreamChunk::text(text);
                        }
                        SseLine::Usage(u) => usage = Some(u),
                        SseLine::Done => break 'read,
                        SseLine::Skip => {}
                    }
                }
            }

            yield LlmStreamChunk::finished(usage);
        }))
    }
}
