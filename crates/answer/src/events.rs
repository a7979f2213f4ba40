//! Events written to a turn's output channel.

use scout_search::SourceDocument;
use serde::{Deserialize, Serialize};

/// Why a `follow_up_questions` event carries the questions it does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FollowUpOutcome {
    /// At least one question was produced
    Generated,
    /// The provider deliberately returned nothing (greetings, small talk)
    NotWarranted,
    /// The follow-up request failed; the answer is unaffected
    Unavailable,
}

/// One signal on the output channel.
///
/// `Token` carries answer text; every other variant is a side-channel
/// signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    Status {
        message: String,
    },
    Sources {
        sources: Vec<SourceDocument>,
    },
    Symbol {
        symbol: String,
    },
    Token {
        text: String,
    },
    FollowUpQuestions {
        questions: Vec<String>,
        outcome: FollowUpOutcome,
    },
    Complete,
    Error {
        message: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        suggestion: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        code: Option<u16>,
    },
}

impl Event {
    pub fn status(message: impl Into<String>) -> Self {
        Event::Status {
            message: message.into(),
        }
    }

    pub fn token(text: impl Into<String>) -> Self {
        Event::Token { text: text.into() }
    }

    /// Wire name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Event::Status { .. } => "status",
            Event::Sources { .. } => "sources",
            Event::Symbol { .. } => "symbol",
            Event::Token { .. } => "token",
            Event::FollowUpQuestions { .. } => "follow_up_questions",
            Event::Complete => "complete",
            Event::Error { .. } => "error",
        }
    }

    /// Whether this event ends the turn.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Event::Complete | Event::Error { .. })
    }
}

/// An event tagged with the turn that produced it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Envelope {
    pub turn: u64,
    #[serde(flatten)]
    pub event: Event,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_envelope_serialization() {
        let envelope = Envelope {
            turn: 3,
            event: Event::status("Searching"),
        };
        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({"turn": 3, "type": "status", "message": "Searching"})
        );
    }

    #[test]
    fn test_complete_and_error_shapes() {
        let complete = Envelope {
            turn: 1,
            event: Event::Complete,
        };
        assert_eq!(
            serde_json::to_value(&complete).unwrap(),
            json!({"turn": 1, "type": "complete"})
        );

        let error = Event::Error {
            message: "Rate limit exceeded".to_string(),
            suggestion: None,
            code: Some(429),
        };
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({"type": "error", "message": "Rate limit exceeded", "code": 429})
        );
    }

    #[test]
    fn test_follow_up_shape() {
        let event = Event::FollowUpQuestions {
            questions: vec!["Why?".to_string()],
            outcome: FollowUpOutcome::NotWarranted,
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "follow_up_questions");
        assert_eq!(json["outcome"], "not_warranted");
    }

    #[test]
    fn test_envelope_round_trip() {
        let text = r#"{"turn":2,"type":"symbol","symbol":"AAPL"}"#;
        let envelope: Envelope = serde_json::from_str(text).unwrap();
        assert_eq!(envelope.turn, 2);
        assert_eq!(
            envelope.event,
            Event::Symbol {
                symbol: "AAPL".to_string()
            }
        );
    }

    #[test]
    fn test_terminal_events() {
        assert!(Event::Complete.is_terminal());
        assert!(!Event::token("x").is_terminal());
        assert_eq!(Event::token("x").kind(), "token");
    }
}
