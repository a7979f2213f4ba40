//! Request handlers.

use crate::error::ApiError;
use crate::state::AppState;
use crate::wire;
use axum::extract::State;
use axum::response::Response;
use axum::Json;
use scout_answer::{event_channel, Orchestrator, TurnRequest};
use scout_llm::ChatMessage;
use serde::Deserialize;

/// Buffered events per turn before the orchestrator waits for the client.
const EVENT_BUFFER: usize = 64;

/// Body of `POST /api/search`.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchBody {
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
    #[serde(default)]
    pub query: Option<String>,
    #[serde(default, alias = "firecrawlApiKey")]
    pub search_api_key: Option<String>,
    #[serde(default)]
    pub generation_api_key: Option<String>,
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Run one answer turn and stream its events.
///
/// The query and both credentials are checked before the stream opens;
/// those failures are plain JSON error responses. Everything after that is
/// reported in-band as an `error` event.
pub async fn search(
    State(state): State<AppState>,
    Json(body): Json<SearchBody>,
) -> Result<Response, ApiError> {
    let request = TurnRequest {
        history: body.messages,
        query: body.query,
    };
    request.resolve_query()?;

    let search = state.providers.search(body.search_api_key.as_deref())?;
    let llm = state
        .providers
        .generation(body.generation_api_key.as_deref())?;

    let orchestrator = Orchestrator::new(search, llm, state.prompts.clone(), state.settings.clone());
    let turn = state.turns.next_turn();
    let (sink, events) = event_channel(turn, EVENT_BUFFER);

    tracing::info!(turn, history = request.history.len(), "Starting turn");

    let task = tokio::spawn(async move {
        orchestrator.run(&request, &sink).await;
    });

    Ok(wire::stream_response(events, task))
}
