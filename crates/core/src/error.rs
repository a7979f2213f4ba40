//! Error types for Scout.
//!
//! This module defines a unified error enum that covers every failure the
//! answer pipeline can hit: configuration, request validation, provider
//! calls (search and generation), prompt rendering, and caller cancellation.

use thiserror::Error;

/// Unified error type for Scout.
///
/// All fallible functions return `Result<T, AppError>`.
/// Provider failures keep the numeric status code (when the provider sent
/// one) so that callers can turn them into user-facing diagnostics.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// I/O and filesystem errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Prompt system errors
    #[error("Prompt error: {0}")]
    Prompt(String),

    /// The request carried no usable query text
    #[error("Query is required")]
    MissingQuery,

    /// No credential is available for the search provider
    #[error("Search provider API key is not configured")]
    MissingSearchCredential,

    /// No credential is available for the generation provider
    #[error("Generation provider API key is not configured")]
    MissingGenerationCredential,

    /// The search provider rejected or failed a request
    #[error("{}", provider_message("Search", .status, .message))]
    Search { status: Option<u16>, message: String },

    /// The generation provider rejected or failed a request
    #[error("{}", provider_message("LLM", .status, .message))]
    Llm { status: Option<u16>, message: String },

    /// The answer stream broke after it had started
    #[error("Generation failed: {0}")]
    Generation(String),

    /// The caller went away before the turn finished
    #[error("Turn cancelled by caller")]
    Cancelled,

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

fn provider_message(kind: &str, status: &Option<u16>, message: &str) -> String {
    match status {
        Some(code) => format!("{} error ({}): {}", kind, code, message),
        None => format!("{} error: {}", kind, message),
    }
}

impl AppError {
    /// Search provider failure without a status code.
    pub fn search(message: impl Into<String>) -> Self {
        AppError::Search {
            status: None,
            message: message.into(),
        }
    }

    /// Generation provider failure without a status code.
    pub fn llm(message: impl Into<String>) -> Self {
        AppError::Llm {
            status: None,
            message: message.into(),
        }
    }

    /// Numeric status code attached to a provider failure, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            AppError::Search { status, .. } | AppError::Llm { status, .. } => *status,
            _ => None,
        }
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

impl From<serde_yaml::Error> for AppError {
    fn from(err: serde_yaml::Error) -> Self {
        AppError::Serialization(err.to_string())
    }
}

/// Convenience type alias for Results with AppError.
pub type AppResult<T> = Result<T, AppError>;
