//! Generation provider implementations.

pub mod mock;
pub mod ollama;
pub mod openai;

pub use mock::MockClient;
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

use scout_core::AppError;

/// Convert a non-success HTTP response into a status-carrying error.
pub(crate) async fn error_from_response(provider: &str, response: reqwest::Response) -> AppError {
    let status = response.status();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());

    AppError::Llm {
        status: Some(status.as_u16()),
        message: format!("{} API error: {}", provider, extract_error_message(&body)),
    }
}

/// Convert a transport failure; timeouts are reported as 504.
pub(crate) fn error_from_transport(provider: &str, err: reqwest::Error) -> AppError {
    let status = if err.is_timeout() {
        Some(504)
    } else {
        err.status().map(|s| s.as_u16())
    };

    AppError::Llm {
        status,
        message: format!("Failed to reach {}: {}", provider, err),
    }
}

/// Pull `error.message` (or `error` as a string) out of a JSON error body.
pub(crate) fn extract_error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    parsed
        .as_ref()
        .and_then(|v| {
            v.pointer("/error/message")
                .or_else(|| v.get("error"))
                .and_then(|m| m.as_str())
        })
        .map(str::to_string)
        .unwrap_or_else(|| body.trim().to_string())
}

/// Split complete lines off the front of `buffer`, leaving any partial tail.
///
/// The buffer holds raw bytes so a UTF-8 sequence split across network
/// chunks is only decoded once its line is complete.
pub(crate) fn drain_lines(buffer: &mut Vec<u8>) -> Vec<String> {
    let mut lines = Vec::new();
    while let Some(pos) = buffer.iter().position(|b| *b == b'\n') {
        let raw: Vec<u8> = buffer.drain(..=pos).collect();
        let line = String::from_utf8_lossy(&raw);
        let line = line.trim_end_matches(['\n', '\r']);
        if !line.trim().is_empty() {
            lines.push(line.to_string());
        }
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_lines_keeps_partial_tail() {
        let mut buffer = b"first\r\nsecond\n\nthi".to_vec();
        let lines = drain_lines(&mut buffer);
        assert_eq!(lines, vec!["first", "second"]);
        assert_eq!(buffer, b"thi".to_vec());

        buffer.extend_from_slice(b"rd\n");
        assert_eq!(drain_lines(&mut buffer), vec!["third"]);
        assert!(buffer.is_empty());
    }

    #[test]
    fn test_drain_lines_split_multibyte() {
        let bytes = "café\n".as_bytes();
        let mut buffer = bytes[..4].to_vec();
        assert!(drain_lines(&mut buffer).is_empty());
        buffer.extend_from_slice(&bytes[4..]);
        assert_eq!(drain_lines(&mut buffer), vec!["café"]);
    }

    #[test]
    fn test_extract_error_message() {
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"Rate limit reached"}}"#),
            "Rate limit reached"
        );
        assert_eq!(
            extract_error_message(r#"{"error":"model not found"}"#),
            "model not found"
        );
        assert_eq!(extract_error_message("  plain text "), "plain text");
    }
}
