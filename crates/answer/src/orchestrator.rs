//! The state machine driving one query-to-answer turn.
//!
//! A turn moves through
//! `Idle -> Retrieving -> ContextBuilding -> Generating -> FollowUpWaiting -> Finalizing`
//! and ends `Completed` or `Failed`. The orchestrator is the only writer of
//! the turn's event channel: `sources` is written before any token, and
//! `follow_up_questions` and `complete` only after the answer stream has
//! been fully drained.

use crate::classify::{classify, Diagnostic};
use crate::events::Event;
use crate::followups::{FollowUps, FOLLOW_UP_COUNT};
use crate::request::TurnRequest;
use crate::sink::EventSink;
use futures::future::try_join;
use futures::StreamExt;
use scout_core::{AppConfig, AppError, AppResult};
use scout_llm::{ChatMessage, LlmClient, LlmRequest};
use scout_prompt::{build_prompt, PromptDefinition, PromptLibrary};
use scout_search::{
    build_context, detect_symbol, documents_from_results, SearchOptions, SearchProvider,
    SourceDocument,
};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::Instrument;

/// Where a turn is, or where it stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Retrieving,
    ContextBuilding,
    Generating,
    FollowUpWaiting,
    Finalizing,
    Completed,
    Failed,
}

impl TurnState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Retrieving => "retrieving",
            Self::ContextBuilding => "context_building",
            Self::Generating => "generating",
            Self::FollowUpWaiting => "follow_up_waiting",
            Self::Finalizing => "finalizing",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }
}

/// How a turn ended.
#[derive(Debug, Clone, PartialEq)]
pub enum TurnOutcome {
    Completed,
    /// An `error` event was written (if the caller was still there)
    Failed { at: TurnState, diagnostic: Diagnostic },
    /// The caller went away; nothing more was written
    Cancelled { at: TurnState },
}

impl TurnOutcome {
    pub fn is_completed(&self) -> bool {
        matches!(self, Self::Completed)
    }

    /// The state the turn machine ended in.
    pub fn final_state(&self) -> TurnState {
        match self {
            Self::Completed => TurnState::Completed,
            Self::Failed { .. } => TurnState::Failed,
            Self::Cancelled { at } => *at,
        }
    }
}

/// Per-turn tuning.
#[derive(Debug, Clone)]
pub struct TurnSettings {
    /// Generation model identifier
    pub model: String,
    /// Result-count cap for the search provider
    pub search_limit: u32,
    /// Character budget for each document's excerpt
    pub per_document_budget: usize,
    /// Pause after `sources` so clients can render them
    pub sources_delay: Duration,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

impl TurnSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            model: config.model.clone(),
            search_limit: config.search.limit,
            per_document_budget: config.answer.per_document_budget,
            sources_delay: Duration::from_millis(config.answer.sources_delay_ms),
            temperature: config.answer.temperature,
            max_tokens: config.answer.max_tokens,
        }
    }
}

impl Default for TurnSettings {
    fn default() -> Self {
        Self::from_config(&AppConfig::default())
    }
}

/// Runs answer turns against one search provider and one generation
/// provider.
pub struct Orchestrator {
    search: Arc<dyn SearchProvider>,
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLibrary>,
    settings: TurnSettings,
}

impl Orchestrator {
    pub fn new(
        search: Arc<dyn SearchProvider>,
        llm: Arc<dyn LlmClient>,
        prompts: Arc<PromptLibrary>,
        settings: TurnSettings,
    ) -> Self {
        Self {
            search,
            llm,
            prompts,
            settings,
        }
    }

    /// Run one turn, writing its events to `sink`.
    ///
    /// Never fails: a failure after the channel is open is classified and
    /// written as a single `error` event. Callers are expected to have
    /// checked [`TurnRequest::resolve_query`] before opening the channel.
    pub async fn run(&self, request: &TurnRequest, sink: &EventSink) -> TurnOutcome {
        let span = tracing::info_span!("turn", turn = sink.turn());
        self.run_and_report(request, sink).instrument(span).await
    }

    async fn run_and_report(&self, request: &TurnRequest, sink: &EventSink) -> TurnOutcome {
        let mut state = TurnState::Idle;

        match self.execute(request, sink, &mut state).await {
            Ok(()) => {
                tracing::info!("Turn completed");
                TurnOutcome::Completed
            }
            Err(AppError::Cancelled) => {
                tracing::info!(state = state.as_str(), "Caller went away, turn abandoned");
                TurnOutcome::Cancelled { at: state }
            }
            Err(err) => {
                let diagnostic = classify(&err);
                tracing::warn!(state = state.as_str(), error = %err, "Turn failed");

                if sink.emit(diagnostic.to_event()).await.is_err() {
                    tracing::debug!("Error event not delivered");
                }

                TurnOutcome::Failed {
                    at: state,
                    diagnostic,
                }
            }
        }
    }

    async fn execute(
        &self,
        request: &TurnRequest,
        sink: &EventSink,
        state: &mut TurnState,
    ) -> AppResult<()> {
        let query = request.resolve_query()?;

        *state = TurnState::Retrieving;
        sink.emit(Event::status("Searching the web")).await?;
        let documents = self.retrieve(&query, sink).await?;
        let found = format!("Found {} sources", documents.len());
        sink.emit(Event::status(found)).await?;
        sink.emit(Event::Sources {
            sources: documents.clone(),
        })
        .await?;

        if !self.settings.sources_delay.is_zero() {
            let delay = self.settings.sources_delay;
            sink.until_closed(async move {
                tokio::time::sleep(delay).await;
                Ok(())
            })
            .await?;
        }

        *state = TurnState::ContextBuilding;
        if let Some(symbol) = detect_symbol(&query) {
            tracing::debug!(symbol, "Detected symbol");
            sink.emit(Event::Symbol {
                symbol: symbol.to_string(),
            })
            .await?;
        }
        let context = build_context(&documents, &query, self.settings.per_document_budget);
        tracing::debug!(documents = documents.len(), chars = context.len(), "Built context");

        *state = TurnState::Generating;
        let answer_request = self.answer_request(request, &query, &context)?;
        let follow_up_request = self.follow_up_request(request, &query, &documents)?;
        let mut asked = request.asked_questions();
        asked.push(query.clone());

        let answer = self.stream_answer(&answer_request, sink, state);
        let follow_ups = async {
            Ok::<_, AppError>(self.suggest_follow_ups(&follow_up_request, &asked).await)
        };
        let (answer_text, follow_ups) = sink.until_closed(try_join(answer, follow_ups)).await?;

        *state = TurnState::Finalizing;
        tracing::info!(
            answer_chars = answer_text.len(),
            follow_ups = follow_ups.questions.len(),
            outcome = ?follow_ups.outcome,
            "Answer finished"
        );

        sink.emit(Event::FollowUpQuestions {
            questions: follow_ups.questions,
            outcome: follow_ups.outcome,
        })
        .await?;
        sink.emit(Event::Complete).await?;

        *state = TurnState::Completed;
        Ok(())
    }

    /// Search and keep the results that can be cited.
    async fn retrieve(&self, query: &str, sink: &EventSink) -> AppResult<Vec<SourceDocument>> {
        let options = SearchOptions::with_limit(self.settings.search_limit);
        tracing::info!(
            provider = self.search.provider_name(),
            limit = options.limit,
            "Retrieving sources"
        );

        let results = sink.until_closed(self.search.search(query, &options)).await?;
        let received = results.len();
        let documents = documents_from_results(results);
        tracing::info!(received, kept = documents.len(), "Retrieved sources");

        Ok(documents)
    }

    fn answer_request(
        &self,
        request: &TurnRequest,
        query: &str,
        context: &str,
    ) -> AppResult<LlmRequest> {
        let definition = if request.is_follow_up() {
            &self.prompts.followup
        } else {
            &self.prompts.initial
        };

        let mut variables = HashMap::new();
        variables.insert("query".to_string(), query.to_string());
        variables.insert("context".to_string(), context.to_string());
        variables.insert("date".to_string(), today());

        let mut messages = vec![];
        let (system, user) = render(definition, &variables, query)?;
        messages.push(ChatMessage::system(system));
        messages.extend(request.prior_turns());
        messages.push(ChatMessage::user(user));

        let mut llm_request = LlmRequest::new(messages, &self.settings.model).with_streaming();
        if let Some(temperature) = self.settings.temperature {
            llm_request = llm_request.with_temperature(temperature);
        }
        if let Some(max_tokens) = self.settings.max_tokens {
            llm_request = llm_request.with_max_tokens(max_tokens);
        }

        Ok(llm_request)
    }

    fn follow_up_request(
        &self,
        request: &TurnRequest,
        query: &str,
        documents: &[SourceDocument],
    ) -> AppResult<LlmRequest> {
        let previous = request
            .asked_questions()
            .iter()
            .map(|q| format!("- {}", q))
            .collect::<Vec<_>>()
            .join("\n");
        let titles = documents
            .iter()
            .enumerate()
            .map(|(index, doc)| format!("[{}] {}", index + 1, doc.title))
            .collect::<Vec<_>>()
            .join("\n");

        let mut variables = HashMap::new();
        variables.insert("query".to_string(), query.to_string());
        variables.insert("count".to_string(), FOLLOW_UP_COUNT.to_string());
        variables.insert("previousQuestions".to_string(), previous);
        variables.insert("sourceTitles".to_string(), titles);

        let (system, user) = render(&self.prompts.suggestions, &variables, query)?;
        Ok(LlmRequest::new(
            vec![ChatMessage::system(system), ChatMessage::user(user)],
            &self.settings.model,
        ))
    }

    /// Forward answer fragments as `token` events and return the full text.
    async fn stream_answer(
        &self,
        request: &LlmRequest,
        sink: &EventSink,
        state: &mut TurnState,
    ) -> AppResult<String> {
        tracing::info!(
            provider = self.llm.provider_name(),
            model = %request.model,
            messages = request.messages.len(),
            "Streaming answer"
        );

        let mut stream = self.llm.stream(request).await?;
        let mut answer = String::new();
        let mut fragments = 0usize;

        while let Some(chunk) = stream.next().await {
            let chunk = chunk?;

            if !chunk.content.is_empty() {
                answer.push_str(&chunk.content);
                fragments += 1;
                sink.emit(Event::token(chunk.content)).await?;
            }

            if chunk.done {
                if let Some(usage) = chunk.usage {
                    tracing::debug!(
                        prompt_tokens = usage.prompt_tokens,
                        completion_tokens = usage.completion_tokens,
                        "Answer usage"
                    );
                }
                break;
            }
        }

        *state = TurnState::FollowUpWaiting;
        tracing::debug!(fragments, "Answer stream drained");
        Ok(answer)
    }

    /// Ask for follow-up questions. Failure only downgrades the outcome.
    async fn suggest_follow_ups(&self, request: &LlmRequest, asked: &[String]) -> FollowUps {
        match self.llm.complete(request).await {
            Ok(response) => FollowUps::from_completion(&response.content, asked),
            Err(err) => {
                tracing::warn!(error = %err, "Follow-up generation failed");
                FollowUps::unavailable()
            }
        }
    }
}

/// Render a prompt into its system text and user text.
fn render(
    definition: &PromptDefinition,
    variables: &HashMap<String, String>,
    query: &str,
) -> AppResult<(String, String)> {
    let built = build_prompt(definition, variables)?;
    let user = built.user.unwrap_or_else(|| query.to_string());
    Ok((built.system, user))
}

fn today() -> String {
    chrono::Utc::now().format("%B %-d, %Y").to_string()
}
