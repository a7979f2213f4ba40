//! Ticker symbol detection from free text.

use std::sync::OnceLock;

/// Canonical symbol and the names it is known by.
const SYMBOL_ALIASES: &[(&str, &[&str])] = &[
    ("AAPL", &["Apple", "AAPL"]),
    ("MSFT", &["Microsoft", "MSFT"]),
    ("GOOGL", &["Alphabet", "Google", "GOOGL", "GOOG"]),
    ("AMZN", &["Amazon", "AMZN"]),
    ("META", &["Meta Platforms", "Facebook", "Meta"]),
    ("TSLA", &["Tesla", "TSLA"]),
    ("NVDA", &["Nvidia", "NVDA"]),
    ("NFLX", &["Netflix", "NFLX"]),
    ("AMD", &["Advanced Micro Devices", "AMD"]),
    ("INTC", &["Intel", "INTC"]),
    ("ORCL", &["Oracle", "ORCL"]),
    ("CRM", &["Salesforce"]),
    ("IBM", &["IBM"]),
    ("DIS", &["Walt Disney", "Disney"]),
    ("NKE", &["Nike", "NKE"]),
    ("KO", &["Coca-Cola", "Coca Cola"]),
    ("PEP", &["PepsiCo", "Pepsi"]),
    ("WMT", &["Walmart", "WMT"]),
    ("JPM", &["JPMorgan Chase", "JPMorgan", "JP Morgan", "JPM"]),
    ("BAC", &["Bank of America"]),
    ("V", &["Visa"]),
    ("MA", &["Mastercard"]),
    ("BRK.B", &["Berkshire Hathaway", "Berkshire"]),
    ("UBER", &["Uber"]),
    ("ABNB", &["Airbnb", "ABNB"]),
    ("COIN", &["Coinbase"]),
    ("PYPL", &["PayPal", "PYPL"]),
    ("SBUX", &["Starbucks", "SBUX"]),
    ("BA", &["Boeing"]),
    ("TSM", &["Taiwan Semiconductor", "TSMC"]),
];

/// Lowercased aliases in match priority order: longest first, then table order.
fn aliases() -> &'static [(String, &'static str)] {
    static ALIASES: OnceLock<Vec<(String, &'static str)>> = OnceLock::new();
    ALIASES.get_or_init(|| {
        let mut aliases: Vec<(String, &'static str)> = SYMBOL_ALIASES
            .iter()
            .flat_map(|(symbol, names)| names.iter().map(move |name| (name.to_lowercase(), *symbol)))
            .collect();
        // Stable sort keeps table order among equal lengths
        aliases.sort_by(|a, b| b.0.chars().count().cmp(&a.0.chars().count()));
        aliases
    })
}

/// Whether `needle` occurs in `haystack` with no alphanumeric neighbours.
fn contains_word(haystack: &str, needle: &str) -> bool {
    haystack.match_indices(needle).any(|(start, matched)| {
        let end = start + matched.len();
        let before = haystack[..start].chars().next_back();
        let after = haystack[end..].chars().next();
        !before.is_some_and(char::is_alphanumeric) && !after.is_some_and(char::is_alphanumeric)
    })
}

/// Detect the symbol a query refers to, if any.
///
/// Matching is case-insensitive and respects word boundaries. When several
/// aliases match, the longest alias wins.
pub fn detect_symbol(query: &str) -> Option<&'static str> {
    let lower = query.to_lowercase();
    aliases()
        .iter()
        .find(|(alias, _)| contains_word(&lower, alias))
        .map(|(_, symbol)| *symbol)
}
