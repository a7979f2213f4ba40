//! Turning pipeline failures into user-facing diagnostics.

use crate::events::Event;
use scout_core::AppError;
use serde::Serialize;

/// What went wrong, independent of which provider reported it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    MissingQuery,
    MissingSearchCredential,
    MissingGenerationCredential,
    /// 401
    ProviderAuth,
    /// 402
    ProviderQuota,
    /// 429
    RateLimited,
    /// 504 or a transport timeout
    ProviderTimeout,
    /// A provider failure with an unrecognized or absent status
    UnknownProvider(Option<u16>),
    /// The answer stream broke after it started
    GenerationFailure,
    /// Anything else (configuration, prompts, cancellation)
    Internal,
}

impl FailureKind {
    pub fn of(err: &AppError) -> Self {
        match err {
            AppError::MissingQuery => Self::MissingQuery,
            AppError::MissingSearchCredential => Self::MissingSearchCredential,
            AppError::MissingGenerationCredential => Self::MissingGenerationCredential,
            AppError::Search { .. } | AppError::Llm { .. } => match err.status_code() {
                Some(401) => Self::ProviderAuth,
                Some(402) => Self::ProviderQuota,
                Some(429) => Self::RateLimited,
                Some(504) => Self::ProviderTimeout,
                other => Self::UnknownProvider(other),
            },
            AppError::Generation(_) => Self::GenerationFailure,
            _ => Self::Internal,
        }
    }

    /// Status code reported with the diagnostic.
    pub fn code(&self) -> Option<u16> {
        match self {
            Self::ProviderAuth => Some(401),
            Self::ProviderQuota => Some(402),
            Self::RateLimited => Some(429),
            Self::ProviderTimeout => Some(504),
            Self::UnknownProvider(status) => *status,
            _ => None,
        }
    }
}

/// A failure as shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<u16>,
}

impl Diagnostic {
    /// The `error` event that ends a failed turn.
    pub fn to_event(&self) -> Event {
        Event::Error {
            message: self.message.clone(),
            suggestion: self.suggestion.clone(),
            code: self.code,
        }
    }
}

/// Classify a failure.
///
/// Known provider status codes map to a fixed message and suggestion.
/// Everything else keeps the failure's own description and carries no
/// suggestion.
pub fn classify(err: &AppError) -> Diagnostic {
    let kind = FailureKind::of(err);

    let known = match kind {
        FailureKind::ProviderAuth => Some((
            "Invalid API key",
            "Check that your API key is correct and has not expired.",
        )),
        FailureKind::ProviderQuota => Some((
            "Insufficient credits",
            "Add credits or upgrade your plan to continue.",
        )),
        FailureKind::RateLimited => Some((
            "Rate limit exceeded",
            "Wait a moment before trying again.",
        )),
        FailureKind::ProviderTimeout => Some((
            "Request timeout",
            "Try a simpler or more specific query.",
        )),
        _ => None,
    };

    match known {
        Some((message, suggestion)) => Diagnostic {
            message: message.to_string(),
            suggestion: Some(suggestion.to_string()),
            code: kind.code(),
        },
        None => Diagnostic {
            message: err.to_string(),
            suggestion: None,
            code: kind.code(),
        },
    }
}
