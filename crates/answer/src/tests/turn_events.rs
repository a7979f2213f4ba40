//! Event ordering for successful turns.

#[cfg(test)]
mod tests {
    use crate::events::{Event, FollowUpOutcome};
    use crate::orchestrator::TurnOutcome;
    use crate::request::TurnRequest;
    use crate::sink::event_channel;
    use crate::tests::harness::{answer_text, kinds, orchestrator, position, run_turn};
    use scout_llm::{ChatMessage, MockClient, Role};
    use scout_search::MockSearch;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_three_document_turn_order() {
        let search = Arc::new(MockSearch::new());
        let llm = Arc::new(MockClient::new().with_answer("Paris is the capital of France [1]."));
        let orchestrator = orchestrator(&search, &llm);

        let (outcome, events) =
            run_turn(&orchestrator, TurnRequest::new("What is the capital of France?")).await;

        assert_eq!(outcome, TurnOutcome::Completed);
        let kinds = kinds(&events);

        assert_eq!(kinds[0], "status");
        assert_eq!(kinds.iter().filter(|k| **k == "sources").count(), 1);
        assert_eq!(kinds.iter().filter(|k| **k == "symbol").count(), 0);
        assert_eq!(kinds.iter().filter(|k| **k == "follow_up_questions").count(), 1);
        assert_eq!(kinds.last(), Some(&"complete"));

        let sources_at = position(&events, "sources").unwrap();
        let first_token = position(&events, "token").unwrap();
        let follow_ups_at = position(&events, "follow_up_questions").unwrap();
        let complete_at = position(&events, "complete").unwrap();
        let last_token = kinds.iter().rposition(|k| *k == "token").unwrap();

        assert!(sources_at < first_token);
        assert!(last_token < follow_ups_at);
        assert!(follow_ups_at < complete_at);
        assert!(kinds[..sources_at].iter().all(|k| *k == "status"));

        match &events[sources_at].event {
            Event::Sources { sources } => assert_eq!(sources.len(), 3),
            other => panic!("expected sources, got {:?}", other),
        }

        match &events[follow_ups_at].event {
            Event::FollowUpQuestions { questions, outcome } => {
                assert!(questions.len() <= 5);
                assert!(questions.iter().all(|q| !q.trim().is_empty()));
                assert_eq!(*outcome, FollowUpOutcome::Generated);
            }
            other => panic!("expected follow-ups, got {:?}", other),
        }

        assert_eq!(answer_text(&events), "Paris is the capital of France [1].");
        assert!(events.iter().all(|e| e.turn == 1));
    }

    #[tokio::test]
    async fn test_symbol_is_emitted_once() {
        let search = Arc::new(MockSearch::new());
        let llm = Arc::new(MockClient::new());
        let orchestrator = orchestrator(&search, &llm);

        let (_, events) = run_turn(&orchestrator, TurnRequest::new("How is Apple doing lately")).await;

        let symbols: Vec<&Event> = events
            .iter()
            .map(|e| &e.event)
            .filter(|e| matches!(e, Event::Symbol { .. }))
            .collect();
        assert_eq!(
            symbols,
            vec![&Event::Symbol {
                symbol: "AAPL".to_string()
            }]
        );

        let symbol_at = position(&events, "symbol").unwrap();
        assert!(position(&events, "sources").unwrap() < symbol_at);
        assert!(symbol_at < position(&events, "token").unwrap());
    }

    #[tokio::test]
    async fn test_first_turn_prompt_carries_numbered_context() {
        let search = Arc::new(MockSearch::new());
        let llm = Arc::new(MockClient::new());
        let orchestrator = orchestrator(&search, &llm);

        run_turn(&orchestrator, TurnRequest::new("overview please")).await;

        let requests = llm.requests();
        let answer = requests.iter().find(|r| r.stream).unwrap();
        let system = answer.system_prompt().unwrap();

        assert!(system.contains("[1] Overview\nURL: https://example.com/overview"));
        assert!(system.contains("[3] Background\nURL: https://example.net/background"));
        assert_eq!(answer.messages.len(), 2);
        assert_eq!(answer.messages[1], ChatMessage::user("overview please"));
        assert_eq!(answer.model, "mock-model");

        assert_eq!(search.queries(), vec!["overview please".to_string()]);
    }

    #[tokio::test]
    async fn test_follow_up_turn_reuses_history_and_searches_again() {
        let search = Arc::new(MockSearch::new());
        let llm = Arc::new(MockClient::new());
        let orchestrator = orchestrator(&search, &llm);

        let request = TurnRequest::from_history(vec![
            ChatMessage::user("What is Rust?"),
            ChatMessage::assistant("Rust is a systems programming language [1]."),
            ChatMessage::user("Who maintains it?"),
        ]);

        let (outcome, _) = run_turn(&orchestrator, request).await;
        assert!(outcome.is_completed());

        assert_eq!(search.queries(), vec!["Who maintains it?".to_string()]);

        let requests = llm.requests();
        let answer = requests.iter().find(|r| r.stream).unwrap();
        let roles: Vec<Role> = answer.messages.iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::System, Role::User, Role::Assistant, Role::User]
        );
        assert!(answer
            .system_prompt()
            .unwrap()
            .contains("continuing a conversation"));
        assert_eq!(answer.messages[1].content, "What is Rust?");
        assert_eq!(answer.messages[3].content, "Who maintains it?");

        let suggestions = requests.iter().find(|r| !r.stream).unwrap();
        let system = suggestions.system_prompt().unwrap();
        assert!(system.contains("- What is Rust?"));
        assert!(system.contains("Return exactly 5 follow-up questions"));
    }

    #[tokio::test]
    async fn test_empty_follow_ups_are_not_warranted() {
        let search = Arc::new(MockSearch::new());
        let llm = Arc::new(MockClient::new().with_completion("\n"));
        let orchestrator = orchestrator(&search, &llm);

        let (outcome, events) = run_turn(&orchestrator, TurnRequest::new("hello")).await;
        assert!(outcome.is_completed());

        let follow_ups = events
            .iter()
            .find_map(|e| match &e.event {
                Event::FollowUpQuestions { questions, outcome } => Some((questions.clone(), *outcome)),
                _ => None,
            })
            .unwrap();
        assert!(follow_ups.0.is_empty());
        assert_eq!(follow_ups.1, FollowUpOutcome::NotWarranted);
        assert_eq!(kinds(&events).last(), Some(&"complete"));
    }

    #[tokio::test]
    async fn test_follow_ups_are_capped_at_five() {
        let completion = (1..=9).map(|i| format!("Question {}?", i)).collect::<Vec<_>>().join("\n\n");
        let search = Arc::new(MockSearch::new());
        let llm = Arc::new(MockClient::new().with_completion(completion));
        let orchestrator = orchestrator(&search, &llm);

        let (_, events) = run_turn(&orchestrator, TurnRequest::new("tell me more")).await;

        let questions = events
            .iter()
            .find_map(|e| match &e.event {
                Event::FollowUpQuestions { questions, .. } => Some(questions.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(questions.len(), 5);
        assert_eq!(questions[0], "Question 1?");
    }

    #[tokio::test]
    async fn test_results_without_urls_are_not_sources() {
        let search = Arc::new(MockSearch::with_results(vec![
            scout_search::SearchResult::new("https://kept.example", "Kept", "text"),
            scout_search::SearchResult {
                title: Some("No URL".to_string()),
                ..Default::default()
            },
        ]));
        let llm = Arc::new(MockClient::new());
        let orchestrator = orchestrator(&search, &llm);

        let (_, events) = run_turn(&orchestrator, TurnRequest::new("anything")).await;

        let sources = events
            .iter()
            .find_map(|e| match &e.event {
                Event::Sources { sources } => Some(sources.clone()),
                _ => None,
            })
            .unwrap();
        assert_eq!(sources.len(), 1);
        assert_eq!(sources[0].url, "https://kept.example");
    }

    #[tokio::test]
    async fn test_follow_ups_requested_while_answer_streams() {
        let search = Arc::new(MockSearch::new());
        let llm = Arc::new(
            MockClient::new()
                .with_answer("one two three four five six seven eight")
                .with_token_delay(Duration::from_millis(10)),
        );
        let orchestrator = orchestrator(&search, &llm);
        let request = TurnRequest::new("What is Rust?");
        let (sink, mut rx) = event_channel(1, 512);

        let turn = async move {
            let outcome = orchestrator.run(&request, &sink).await;
            drop(sink);
            outcome
        };

        // For each token as it arrives: had the follow-up request gone out?
        let watch = async {
            let mut requested = Vec::new();
            while let Some(envelope) = rx.recv().await {
                if let Event::Token { .. } = envelope.event {
                    requested.push(llm.requests().iter().any(|r| !r.stream));
                }
            }
            requested
        };

        let (outcome, requested) = tokio::join!(turn, watch);

        assert_eq!(outcome, TurnOutcome::Completed);
        assert_eq!(requested.len(), 8);
        assert_eq!(
            requested.first(),
            Some(&true),
            "follow-up request waited for the answer stream"
        );
    }
}
