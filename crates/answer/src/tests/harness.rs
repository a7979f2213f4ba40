//! Shared setup for turn scenarios.

use crate::events::{Envelope, Event};
use crate::orchestrator::{Orchestrator, TurnOutcome, TurnSettings};
use crate::request::TurnRequest;
use crate::sink::event_channel;
use scout_llm::MockClient;
use scout_prompt::PromptLibrary;
use scout_search::MockSearch;
use std::sync::Arc;
use std::time::Duration;

pub fn settings() -> TurnSettings {
    TurnSettings {
        model: "mock-model".to_string(),
        search_limit: 6,
        per_document_budget: 2000,
        sources_delay: Duration::ZERO,
        temperature: None,
        max_tokens: None,
    }
}

pub fn orchestrator(search: &Arc<MockSearch>, llm: &Arc<MockClient>) -> Orchestrator {
    Orchestrator::new(
        search.clone(),
        llm.clone(),
        Arc::new(PromptLibrary::built_in().unwrap()),
        settings(),
    )
}

/// Run a turn to the end and collect everything it wrote.
pub async fn run_turn(
    orchestrator: &Orchestrator,
    request: TurnRequest,
) -> (TurnOutcome, Vec<Envelope>) {
    let (sink, mut rx) = event_channel(1, 512);
    let outcome = orchestrator.run(&request, &sink).await;
    drop(sink);

    let mut events = Vec::new();
    while let Some(envelope) = rx.recv().await {
        events.push(envelope);
    }
    (outcome, events)
}

pub fn kinds(events: &[Envelope]) -> Vec<&'static str> {
    events.iter().map(|e| e.event.kind()).collect()
}

pub fn position(events: &[Envelope], kind: &str) -> Option<usize> {
    events.iter().position(|e| e.event.kind() == kind)
}

pub fn answer_text(events: &[Envelope]) -> String {
    events
        .iter()
        .filter_map(|e| match &e.event {
            Event::Token { text } => Some(text.as_str()),
            _ => None,
        })
        .collect()
}
