//! Scripted provider for offline runs and tests.
//!
//! Streams a fixed answer word by word and returns a fixed completion.
//! Failures can be injected before the stream starts, part-way through it,
//! or on the non-streaming call.

use crate::client::{LlmClient, LlmRequest, LlmResponse, LlmStream, LlmStreamChunk, LlmUsage};
use async_stream::try_stream;
use scout_core::{AppError, AppResult};
use std::sync::Mutex;
use std::time::Duration;

const DEFAULT_ANSWER: &str = "According to the retrieved sources, the answer is summarized in [1].";
const DEFAULT_COMPLETION: &str = "What are the main sources of disagreement?\n\
What happened most recently?\n\
How does this compare historically?\n\
Who are the key people involved?\n\
Where can I read more about this?";

#[derive(Debug, Clone)]
struct Failure {
    status: Option<u16>,
    message: String,
}

impl Failure {
    fn to_error(&self) -> AppError {
        AppError::Llm {
            status: self.status,
            message: self.message.clone(),
        }
    }
}

/// Mock LLM client with scripted output.
pub struct MockClient {
    answer: String,
    completion: String,
    stream_failure: Option<Failure>,
    mid_stream_failure: Option<(usize, String)>,
    complete_failure: Option<Failure>,
    token_delay: Option<Duration>,
    requests: Mutex<Vec<LlmRequest>>,
}

impl MockClient {
    pub fn new() -> Self {
        Self {
            answer: DEFAULT_ANSWER.to_string(),
            completion: DEFAULT_COMPLETION.to_string(),
            stream_failure: None,
            mid_stream_failure: None,
            complete_failure: None,
            token_delay: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Text streamed back for every streaming request.
    pub fn with_answer(mut self, answer: impl Into<String>) -> Self {
        self.answer = answer.into();
        self
    }

    /// Text returned for every non-streaming request.
    pub fn with_completion(mut self, completion: impl Into<String>) -> Self {
        self.completion = completion.into();
        self
    }

    /// Reject streaming requests before any token is produced.
    pub fn failing_stream(mut self, status: Option<u16>, message: impl Into<String>) -> Self {
        self.stream_failure = Some(Failure {
            status,
            message: message.into(),
        });
        self
    }

    /// Emit `tokens` fragments, then fail the stream.
    pub fn failing_after(mut self, tokens: usize, message: impl Into<String>) -> Self {
        self.mid_stream_failure = Some((tokens, message.into()));
        self
    }

    /// Reject non-streaming requests.
    pub fn failing_completion(mut self, status: Option<u16>, message: impl Into<String>) -> Self {
        self.complete_failure = Some(Failure {
            status,
            message: message.into(),
        });
        self
    }

    /// Sleep between streamed fragments.
    pub fn with_token_delay(mut self, delay: Duration) -> Self {
        self.token_delay = Some(delay);
        self
    }

    /// Requests received so far, in arrival order.
    pub fn requests(&self) -> Vec<LlmRequest> {
        self.requests
            .lock()
            .map(|r| r.clone())
            .unwrap_or_default()
    }

    fn record(&self, request: &LlmRequest) {
        if let Ok(mut requests) = self.requests.lock() {
            requests.push(request.clone());
        }
    }
}

impl Default for MockClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Split text into fragments that concatenate back to the original.
fn fragments(text: &str) -> Vec<String> {
    text.split_inclusive(' ').map(str::to_string).collect()
}

#[async_trait::async_trait]
impl LlmClient for MockClient {
    fn provider_name(&self) -> &str {
        "mock"
    }

    async fn complete(&self, request: &LlmRequest) -> AppResult<LlmResponse> {
        self.record(request);

        if let Some(failure) = &self.complete_failure {
            return Err(failure.to_error());
        }

        Ok(LlmResponse {
            content: self.completion.clone(),
            model: request.model.clone(),
            usage: LlmUsage::default(),
        })
    }

    async fn stream(&self, request: &LlmRequest) -> AppResult<LlmStream> {
        self.record(request);

        if let Some(failure) = &self.stream_failure {
            return Err(failure.to_error());
        }

        let pieces = fragments(&self.answer);
        let mid_stream_failure = self.mid_stream_failure.clone();
        let delay = self.token_delay;

        Ok(Box::pin(try_stream! {
            for (index, piece) in pieces.into_iter().enumerate() {
                if let Some((after, message)) = &mid_stream_failure {
                    if index == *after {
                        Err(AppError::Generation(message.clone()))?;
                    }
                }
                if let Some(delay) = delay {
                    tokio::time::sleep(delay).await;
                }
                yield LlmStreamChunk::text(piece);
            }
            yield LlmStreamChunk::finished(None);
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChatMessage;
    use futures::StreamExt;

    fn request() -> LlmRequest {
        LlmRequest::new(vec![ChatMessage::user("hi")], "mock-model")
    }

    #[tokio::test]
    async fn test_stream_reassembles_answer() {
        let client = MockClient::new().with_answer("Paris is the capital [1].");
        let mut stream = client.stream(&request()).await.unwrap();

        let mut text = String::new();
        let mut finished = false;
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.unwrap();
            text.push_str(&chunk.content);
            finished |= chunk.done;
        }

        assert_eq!(text, "Paris is the capital [1].");
        assert!(finished);
        assert_eq!(client.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_stream_failure_carries_status() {
        let client = MockClient::new().failing_stream(Some(429), "Too many requests");
        match client.stream(&request()).await {
            Err(err) => assert_eq!(err.status_code(), Some(429)),
            Ok(_) => panic!("expected failure"),
        }
    }

    #[tokio::test]
    async fn test_mid_stream_failure() {
        let client = MockClient::new()
            .with_answer("one two three")
            .failing_after(2, "connection reset");
        let items: Vec<_> = client.stream(&request()).await.unwrap().collect().await;

        assert_eq!(items.len(), 3);
        assert!(items[0].is_ok() && items[1].is_ok());
        assert!(matches!(items[2], Err(AppError::Generation(_))));
    }

    #[tokio::test]
    async fn test_complete_returns_scripted_text() {
        let client = MockClient::new().with_completion("A?\nB?");
        let response = client.complete(&request()).await.unwrap();
        assert_eq!(response.content, "A?\nB?");
        assert_eq!(response.model, "mock-model");
    }
}
