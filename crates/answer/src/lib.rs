//! Query-to-answer orchestration for Scout.
//!
//! One turn retrieves sources, builds a numbered context, streams a cited
//! answer while follow-up questions are generated alongside it, and writes
//! everything to a single ordered event channel.

pub mod classify;
pub mod events;
pub mod followups;
pub mod orchestrator;
pub mod request;
pub mod sequence;
pub mod sink;

#[cfg(test)]
mod tests;

// Re-export commonly used types
pub use classify::{classify, Diagnostic, FailureKind};
pub use events::{Envelope, Event, FollowUpOutcome};
pub use followups::{parse_follow_ups, FollowUps, FOLLOW_UP_COUNT};
pub use orchestrator::{Orchestrator, TurnOutcome, TurnSettings, TurnState};
pub use request::TurnRequest;
pub use sequence::TurnSequence;
pub use sink::{event_channel, EventSink};
