//! Follow-up question parsing.

use crate::events::FollowUpOutcome;

/// Maximum number of follow-up questions per turn.
pub const FOLLOW_UP_COUNT: usize = 5;

/// Split provider output into questions.
///
/// One question per line, trimmed, with list markers removed. Empty lines
/// are dropped and at most [`FOLLOW_UP_COUNT`] questions are kept.
pub fn parse_follow_ups(text: &str) -> Vec<String> {
    collect_questions(text, &[])
}

/// Remove a leading `-`, `*`, `•`, `1.` or `1)` marker.
fn strip_marker(line: &str) -> &str {
    let line = line.trim();

    for bullet in ["- ", "* ", "• "] {
        if let Some(rest) = line.strip_prefix(bullet) {
            return rest.trim();
        }
    }

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 && digits <= 2 {
        let rest = &line[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            return rest.trim();
        }
    }

    line
}

/// Questions for the `follow_up_questions` event.
#[derive(Debug, Clone, PartialEq)]
pub struct FollowUps {
    pub questions: Vec<String>,
    pub outcome: FollowUpOutcome,
}

impl FollowUps {
    /// Parse a completion, dropping questions the user already asked.
    pub fn from_completion(text: &str, asked: &[String]) -> Self {
        let questions = collect_questions(text, asked);
        let outcome = if questions.is_empty() {
            FollowUpOutcome::NotWarranted
        } else {
            FollowUpOutcome::Generated
        };

        Self { questions, outcome }
    }

    /// The follow-up request failed.
    pub fn unavailable() -> Self {
        Self {
            questions: Vec::new(),
            outcome: FollowUpOutcome::Unavailable,
        }
    }
}

fn collect_questions(text: &str, asked: &[String]) -> Vec<String> {
    text.lines()
        .map(strip_marker)
        .filter(|line| !line.is_empty())
        .filter(|line| !asked.iter().any(|q| q.trim().eq_ignore_ascii_case(line)))
        .map(str::to_string)
        .take(FOLLOW_UP_COUNT)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_and_trims() {
        let text = "  What is Rust?  \n\nWho created it?\n   \nIs it fast?\n";
        assert_eq!(
            parse_follow_ups(text),
            vec!["What is Rust?", "Who created it?", "Is it fast?"]
        );
    }

    #[test]
    fn test_truncates_to_five() {
        let text = (1..=8).map(|i| format!("Question {}?", i)).collect::<Vec<_>>().join("\n");
        let questions = parse_follow_ups(&text);
        assert_eq!(questions.len(), FOLLOW_UP_COUNT);
        assert_eq!(questions[0], "Question 1?");
        assert_eq!(questions[4], "Question 5?");
    }

    #[test]
    fn test_list_markers_removed() {
        let text = "1. First?\n2) Second?\n- Third?\n* Fourth?\n2024 results?";
        assert_eq!(
            parse_follow_ups(text),
            vec!["First?", "Second?", "Third?", "Fourth?", "2024 results?"]
        );
    }

    #[test]
    fn test_empty_output_is_not_warranted() {
        let follow_ups = FollowUps::from_completion("\n  \n", &[]);
        assert!(follow_ups.questions.is_empty());
        assert_eq!(follow_ups.outcome, FollowUpOutcome::NotWarranted);
    }

    #[test]
    fn test_already_asked_questions_are_dropped() {
        let asked = vec!["What is Rust?".to_string()];
        let follow_ups = FollowUps::from_completion("what is rust?\nWho uses Rust?", &asked);
        assert_eq!(follow_ups.questions, vec!["Who uses Rust?"]);
        assert_eq!(follow_ups.outcome, FollowUpOutcome::Generated);
    }

    #[test]
    fn test_unavailable() {
        let follow_ups = FollowUps::unavailable();
        assert!(follow_ups.questions.is_empty());
        assert_eq!(follow_ups.outcome, FollowUpOutcome::Unavailable);
    }
}
