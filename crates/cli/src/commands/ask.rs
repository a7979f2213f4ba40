//! Ask command handler.
//!
//! Runs one answer turn locally and prints it as it streams.

use clap::Args;
use scout_answer::{
    event_channel, Envelope, Event, Orchestrator, TurnOutcome, TurnRequest, TurnSettings,
};
use scout_core::{config::AppConfig, AppError, AppResult};
use scout_prompt::PromptLibrary;
use scout_search::SourceDocument;
use scout_server::{ConfiguredProviders, ProviderSource};
use std::io::Write;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;

/// Events buffered between the turn and the terminal.
const EVENT_BUFFER: usize = 64;

/// Answer one question and print it
#[derive(Args, Debug)]
pub struct AskCommand {
    /// The question to ask
    pub question: Option<String>,

    /// Read the question from a file
    #[arg(short, long, conflicts_with = "question")]
    pub file: Option<PathBuf>,

    /// Print every event as one JSON line
    #[arg(long)]
    pub json: bool,

    /// Search provider API key (overrides the configured key)
    #[arg(long)]
    pub search_api_key: Option<String>,

    /// Generation provider API key (overrides the configured key)
    #[arg(long)]
    pub generation_api_key: Option<String>,
}

/// What the text output prints after the answer.
#[derive(Default)]
struct Footer {
    sources: Vec<SourceDocument>,
    symbol: Option<String>,
    follow_ups: Vec<String>,
}

impl AskCommand {
    /// Execute the ask command.
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let question = self.question()?;
        config.validate()?;

        let providers = ConfiguredProviders::new(Arc::new(config.clone()));
        let search = providers.search(self.search_api_key.as_deref())?;
        let llm = providers.generation(self.generation_api_key.as_deref())?;
        let prompts = PromptLibrary::load(&config.workspace)?;

        // Nothing to render between sources and tokens in a terminal
        let settings = TurnSettings {
            sources_delay: Duration::ZERO,
            ..TurnSettings::from_config(config)
        };

        let orchestrator = Orchestrator::new(search, llm, Arc::new(prompts), settings);
        let outcome = self
            .run_turn(orchestrator, TurnRequest::new(question), std::io::stdout())
            .await?;

        match outcome {
            TurnOutcome::Completed => Ok(()),
            TurnOutcome::Failed { diagnostic, .. } => Err(AppError::Other(diagnostic.message)),
            TurnOutcome::Cancelled { .. } => Err(AppError::Cancelled),
        }
    }

    /// The question from the argument or the file, trimmed.
    fn question(&self) -> AppResult<String> {
        let text = match (&self.question, &self.file) {
            (Some(question), _) => question.clone(),
            (None, Some(path)) => std::fs::read_to_string(path)?,
            (None, None) => String::new(),
        };

        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::MissingQuery);
        }
        Ok(text.to_string())
    }

    /// Run the turn while printing its events to `out`.
    ///
    /// The receiver is owned by the printer, so a failed write closes the
    /// channel and the turn stops at its next event.
    async fn run_turn(
        &self,
        orchestrator: Orchestrator,
        request: TurnRequest,
        out: impl Write,
    ) -> AppResult<TurnOutcome> {
        let (sink, events) = event_channel(1, EVENT_BUFFER);

        let turn = async move { orchestrator.run(&request, &sink).await };
        let (outcome, printed) = tokio::join!(turn, self.print_events(events, out));
        printed?;

        Ok(outcome)
    }

    async fn print_events(
        &self,
        mut events: mpsc::Receiver<Envelope>,
        mut stdout: impl Write,
    ) -> AppResult<()> {
        let mut footer = Footer::default();

        while let Some(envelope) = events.recv().await {
            let terminal = envelope.event.is_terminal();

            if self.json {
                writeln!(stdout, "{}", serde_json::to_string(&envelope)?)?;
            } else {
                print_event(&mut stdout, &mut footer, envelope.event)?;
            }

            if terminal {
                break;
            }
        }

        stdout.flush()?;
        Ok(())
    }
}

fn print_event(out: &mut impl Write, footer: &mut Footer, event: Event) -> AppResult<()> {
    match event {
        Event::Status { message } => eprintln!("{}", message),
        Event::Sources { sources } => footer.sources = sources,
        Event::Symbol { symbol } => footer.symbol = Some(symbol),
        Event::Token { text } => {
            write!(out, "{}", text)?;
            out.flush()?;
        }
        Event::FollowUpQuestions { questions, .. } => footer.follow_ups = questions,
        Event::Complete => print_footer(out, footer)?,
        Event::Error {
            message,
            suggestion,
            code,
        } => {
            writeln!(out)?;
            match code {
                Some(code) => eprintln!("Error ({}): {}", code, message),
                None => eprintln!("Error: {}", message),
            }
            if let Some(suggestion) = suggestion {
                eprintln!("Suggestion: {}", suggestion);
            }
        }
    }
    Ok(())
}

fn print_footer(out: &mut impl Write, footer: &Footer) -> AppResult<()> {
    writeln!(out)?;

    if !footer.sources.is_empty() {
        writeln!(out, "\nSources:")?;
        for (index, source) in footer.sources.iter().enumerate() {
            writeln!(out, "[{}] {} - {}", index + 1, source.title, source.url)?;
        }
    }

    if let Some(symbol) = &footer.symbol {
        writeln!(out, "\nSymbol: {}", symbol)?;
    }

    if !footer.follow_ups.is_empty() {
        writeln!(out, "\nFollow-up questions:")?;
        for question in &footer.follow_ups {
            writeln!(out, "- {}", question)?;
        }
    }

    Ok(())
}
