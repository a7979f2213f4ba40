//! Query-relevant excerpt selection.
//!
//! A document longer than the budget is cut into contiguous windows that
//! cover it without gaps and never split a query term occurrence. Windows
//! are scored by the occurrences that start in them, the best ones are accepted greedily while the excerpt
//! stays within budget, and the accepted windows are rendered in document
//! order. Lengths are counted in `char`s and every cut falls on a grapheme
//! boundary.

use std::collections::HashSet;
use unicode_segmentation::UnicodeSegmentation;

/// Upper bound on the size of one candidate window, in chars.
const WINDOW_CHARS: usize = 500;

/// Placed between non-adjacent windows in the excerpt.
const GAP_MARKER: &str = "\n...\n";

const STOPWORDS: &[&str] = &[
    "a", "about", "an", "and", "are", "as", "at", "be", "been", "but", "by", "can", "could", "did",
    "do", "does", "for", "from", "had", "has", "have", "how", "i", "if", "in", "into", "is", "it",
    "its", "me", "my", "no", "not", "of", "on", "or", "our", "should", "so", "than", "that", "the",
    "their", "them", "then", "there", "these", "they", "this", "those", "to", "was", "we", "were",
    "what", "when", "where", "which", "who", "whom", "why", "will", "with", "would", "you", "your",
];

/// Lowercase query terms with stopwords removed, deduplicated in order.
pub fn query_terms(query: &str) -> Vec<String> {
    let lower = query.to_lowercase();
    let mut seen = HashSet::new();
    lower
        .split(|c: char| !c.is_alphanumeric())
        .filter(|term| !term.is_empty() && !STOPWORDS.contains(term))
        .filter(|term| term.chars().count() > 1 || term.chars().all(|c| c.is_numeric()))
        .filter(|term| seen.insert(term.to_string()))
        .map(str::to_string)
        .collect()
}

/// Select the part of `text` most relevant to `query`, at most `max_chars` long.
///
/// Text that already fits is returned unchanged. When no query term occurs
/// in any window, the leading part of the text is returned instead.
pub fn select_excerpt(text: &str, query: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    if max_chars == 0 {
        return String::new();
    }

    let segmented = Segmented::new(text);
    let terms = query_terms(query);
    let spans = segmented.term_spans(&terms);
    let windows = segmented.windows(max_chars.min(WINDOW_CHARS), &spans);

    let scores: Vec<usize> = windows
        .iter()
        .map(|w| {
            spans
                .iter()
                .filter(|span| (w.start..w.end).contains(&segmented.bytes[span.start]))
                .count()
        })
        .collect();

    let mut ranked: Vec<usize> = (0..windows.len()).filter(|&i| scores[i] > 0).collect();
    ranked.sort_by(|&a, &b| scores[b].cmp(&scores[a]).then(a.cmp(&b)));

    if ranked.is_empty() {
        tracing::trace!(terms = terms.len(), "No query term matched, using leading text");
        return segmented.leading(max_chars);
    }

    let mut chosen: Vec<usize> = Vec::new();
    for index in ranked {
        let mut candidate = chosen.clone();
        candidate.push(index);
        candidate.sort_unstable();

        if render(text, &windows, &candidate).chars().count() <= max_chars {
            chosen = candidate;
        }
    }

    render(text, &windows, &chosen)
}

/// Byte length of the prefix of `text` that lowercases to `term`.
fn prefix_match(text: &str, term: &str) -> Option<usize> {
    let mut expected = term.chars().peekable();
    for (offset, c) in text.char_indices() {
        for lower in c.to_lowercase() {
            if expected.next() != Some(lower) {
                return None;
            }
        }
        if expected.peek().is_none() {
            return Some(offset + c.len_utf8());
        }
    }
    None
}

/// Join chosen windows (sorted by index), merging adjacent ones.
fn render(text: &str, windows: &[Window], chosen: &[usize]) -> String {
    let mut groups: Vec<(usize, usize)> = Vec::new();
    let mut previous: Option<usize> = None;

    for &index in chosen {
        let window = windows[index];
        let adjacent = previous.is_some_and(|p| p + 1 == index);
        match groups.last_mut() {
            Some(group) if adjacent => group.1 = window.end,
            _ => groups.push((window.start, window.end)),
        }
        previous = Some(index);
    }

    groups
        .iter()
        .map(|&(start, end)| text[start..end].trim())
        .collect::<Vec<_>>()
        .join(GAP_MARKER)
}

/// A byte range of the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    start: usize,
    end: usize,
}

/// One term occurrence, as boundary indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Span {
    start: usize,
    end: usize,
}

/// Grapheme boundaries of a text with their char offsets.
struct Segmented<'a> {
    text: &'a str,
    /// Byte offset of each boundary, including `text.len()`
    bytes: Vec<usize>,
    /// Char offset of each boundary
    chars: Vec<usize>,
}

impl<'a> Segmented<'a> {
    fn new(text: &'a str) -> Self {
        let mut bytes = Vec::new();
        let mut chars = Vec::new();
        let mut count = 0;

        for (offset, grapheme) in text.grapheme_indices(true) {
            bytes.push(offset);
            chars.push(count);
            count += grapheme.chars().count();
        }
        bytes.push(text.len());
        chars.push(count);

        Self { text, bytes, chars }
    }

    /// Index of the last boundary.
    fn last(&self) -> usize {
        self.bytes.len() - 1
    }

    /// The grapheme ending at boundary `k` (k >= 1).
    fn grapheme_before(&self, k: usize) -> &str {
        &self.text[self.bytes[k - 1]..self.bytes[k]]
    }

    fn is_paragraph_break(&self, k: usize) -> bool {
        self.text[..self.bytes[k]].ends_with("\n\n")
    }

    fn is_whitespace_break(&self, k: usize) -> bool {
        self.grapheme_before(k).chars().all(char::is_whitespace)
    }

    fn is_word_break(&self, k: usize) -> bool {
        !self.grapheme_before(k).chars().any(char::is_alphanumeric)
    }

    /// Case-insensitive occurrences of `terms` starting at a boundary, in
    /// text order.
    fn term_spans(&self, terms: &[String]) -> Vec<Span> {
        let mut spans = Vec::new();
        for start in 0..self.last() {
            let rest = &self.text[self.bytes[start]..];
            for term in terms {
                if let Some(len) = prefix_match(rest, term) {
                    let end_byte = self.bytes[start] + len;
                    let end = self.bytes.partition_point(|&b| b < end_byte);
                    spans.push(Span { start, end });
                }
            }
        }
        spans
    }

    /// Furthest boundary after `from` that is at most `width` chars away.
    fn reach(&self, from: usize, width: usize) -> usize {
        let limit = self.chars[from] + width;
        let end = self.chars.partition_point(|&c| c <= limit) - 1;
        end.max(from + 1).min(self.last())
    }

    /// Pick a cut in `(from, to]`, preferring paragraph breaks, then
    /// whitespace in the second half, then any word boundary, then any
    /// boundary outside a term occurrence.
    fn cut(&self, from: usize, to: usize, spans: &[Span]) -> usize {
        if to == self.last() {
            return to;
        }
        let half = from + (to - from).div_ceil(2);
        let splits_term = |k: usize| spans.iter().any(|s| s.start < k && k < s.end);

        (half..=to)
            .rev()
            .find(|&k| self.is_paragraph_break(k))
            .or_else(|| (half..=to).rev().find(|&k| self.is_whitespace_break(k)))
            .or_else(|| ((from + 1)..=to).rev().find(|&k| self.is_word_break(k)))
            .or_else(|| ((from + 1)..=to).rev().find(|&k| !splits_term(k)))
            .unwrap_or(to)
    }

    /// Contiguous windows of at most `width` chars covering the text.
    fn windows(&self, width: usize, spans: &[Span]) -> Vec<Window> {
        let mut windows = Vec::new();
        let mut from = 0;

        while from < self.last() {
            let to = self.cut(from, self.reach(from, width), spans);
            windows.push(Window {
                start: self.bytes[from],
                end: self.bytes[to],
            });
            from = to;
        }

        windows
    }

    /// Leading text of at most `max_chars`, cut near whitespace.
    fn leading(&self, max_chars: usize) -> String {
        let limit = self.chars.partition_point(|&c| c <= max_chars) - 1;
        if limit == 0 {
            return String::new();
        }

        let half = limit.div_ceil(2);
        let end = (half..=limit)
            .rev()
            .find(|&k| self.is_whitespace_break(k))
            .unwrap_or(limit);

        self.text[..self.bytes[end]].trim_end().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_terms() {
        assert_eq!(
            query_terms("What is the capital of France? The CAPITAL!"),
            vec!["capital", "france"]
        );
        assert_eq!(query_terms("a b 7 it's"), vec!["7"]);
        assert!(query_terms("").is_empty());
    }

    #[test]
    fn test_short_text_unchanged() {
        let text = "  Short text with trailing spaces  ";
        assert_eq!(select_excerpt(text, "anything", 100), text);
        assert_eq!(select_excerpt(text, "anything", text.len()), text);
    }

    #[test]
    fn test_zero_budget() {
        assert_eq!(select_excerpt("some text", "text", 0), "");
    }

    #[test]
    fn test_windows_cover_text_without_gaps() {
        let text = "word ".repeat(400) + "\n\nnext paragraph " + &"tail ".repeat(50);
        let segmented = Segmented::new(&text);
        let windows = segmented.windows(300, &[]);

        assert_eq!(windows.first().unwrap().start, 0);
        assert_eq!(windows.last().unwrap().end, text.len());
        for pair in windows.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        for w in &windows {
            assert!(text[w.start..w.end].chars().count() <= 300);
        }
    }

    #[test]
    fn test_prefers_paragraph_break() {
        let text = format!("{}\n\n{}", "a".repeat(200) + " ", "b ".repeat(200));
        let segmented = Segmented::new(&text);
        let windows = segmented.windows(300, &[]);
        assert!(text[..windows[0].end].ends_with("\n\n"));
    }

    #[test]
    fn test_grapheme_safe_cuts() {
        // Each family emoji is one grapheme made of several chars
        let text = "👨‍👩‍👧 café ".repeat(300);
        let excerpt = select_excerpt(&text, "nothing matches", 101);
        assert!(excerpt.chars().count() <= 101);
        assert!(text.starts_with(&excerpt));
        assert!(!excerpt.ends_with('\u{200d}'));
    }

    #[test]
    fn test_fallback_to_leading_text() {
        let text = "alpha beta gamma ".repeat(100);
        let excerpt = select_excerpt(&text, "zeta", 50);
        assert!(excerpt.chars().count() <= 50);
        assert!(text.starts_with(&excerpt));
        assert!(excerpt.ends_with("alpha") || excerpt.ends_with("beta") || excerpt.ends_with("gamma"));
    }

    #[test]
    fn test_non_adjacent_windows_keep_document_order() {
        let filler = "lorem ipsum dolor sit amet ".repeat(40);
        let text = format!(
            "first mention of rust here. {filler}{filler}rust rust rust second. {filler}{filler}"
        );
        let excerpt = select_excerpt(&text, "rust", 1600);

        assert!(excerpt.chars().count() <= 1600);
        let first = excerpt.find("first mention").unwrap();
        let second = excerpt.find("rust rust rust").unwrap();
        assert!(first < second);
        assert!(excerpt.contains(GAP_MARKER));
    }

    #[test]
    fn test_highest_score_wins_when_only_one_fits() {
        let filler = "lorem ipsum dolor sit amet ".repeat(40);
        let text = format!("tokio once. {filler}{filler}tokio tokio tokio here. {filler}");
        let excerpt = select_excerpt(&text, "tokio", 400);
        assert!(excerpt.chars().count() <= 400);
        assert!(excerpt.contains("tokio tokio"));
        assert!(!excerpt.contains("tokio once"));
    }

    #[test]
    fn test_term_inside_unbroken_run_is_kept() {
        let text = format!("{}needle{}", "a".repeat(17), "b".repeat(60));
        let excerpt = select_excerpt(&text, "needle", 20);
        assert!(excerpt.chars().count() <= 20);
        assert!(excerpt.contains("needle"), "excerpt: {:?}", excerpt);
    }

    #[test]
    fn test_term_spans_ignore_case() {
        let text = "Tokio and TOKIO, not tok.";
        let segmented = Segmented::new(text);
        let spans = segmented.term_spans(&["tokio".to_string()]);
        let found: Vec<&str> = spans
            .iter()
            .map(|s| &text[segmented.bytes[s.start]..segmented.bytes[s.end]])
            .collect();
        assert_eq!(found, vec!["Tokio", "TOKIO"]);
    }
}
