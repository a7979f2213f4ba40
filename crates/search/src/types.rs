//! Search result and source document types.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// One raw result as returned by a search provider.
///
/// Every field is optional because providers do not guarantee any of them;
/// [`documents_from_results`] turns these into validated [`SourceDocument`]s.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub url: Option<String>,

    #[serde(default)]
    pub title: Option<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Plain text content
    #[serde(default, alias = "content")]
    pub text: Option<String>,

    /// Rendered markdown content
    #[serde(default)]
    pub markdown: Option<String>,

    /// Provider metadata (published date, author, image, site name, ...)
    #[serde(default)]
    pub metadata: serde_json::Value,
}

impl SearchResult {
    /// Result with a URL, title and markdown body.
    pub fn new(
        url: impl Into<String>,
        title: impl Into<String>,
        markdown: impl Into<String>,
    ) -> Self {
        Self {
            url: Some(url.into()),
            title: Some(title.into()),
            markdown: Some(markdown.into()),
            ..Default::default()
        }
    }

    fn meta(&self, keys: &[&str]) -> Option<String> {
        keys.iter()
            .filter_map(|key| self.metadata.get(*key))
            .find_map(|value| match value {
                serde_json::Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
                serde_json::Value::Array(items) => items
                    .iter()
                    .find_map(|item| item.as_str().map(str::to_string)),
                _ => None,
            })
    }
}

/// A retrieved web document, identified by its URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceDocument {
    pub url: String,

    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub markdown: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_date: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub site_name: Option<String>,
}

impl SourceDocument {
    /// Body used for excerpt selection: markdown, else text, else empty.
    pub fn content(&self) -> &str {
        self.markdown
            .as_deref()
            .filter(|m| !m.is_empty())
            .or(self.text.as_deref())
            .unwrap_or("")
    }
}

/// Options passed to a search provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Maximum number of results
    pub limit: u32,

    /// Content formats to extract (e.g. "markdown")
    pub formats: Vec<String>,
}

impl SearchOptions {
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit,
            ..Default::default()
        }
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 6,
            formats: vec!["markdown".to_string()],
        }
    }
}

/// Convert raw results into source documents.
///
/// Drops results without a usable URL and repeated URLs (first wins).
/// Input order is preserved; it defines the citation numbers.
pub fn documents_from_results(results: Vec<SearchResult>) -> Vec<SourceDocument> {
    let mut seen = HashSet::new();
    let mut documents = Vec::with_capacity(results.len());

    for result in results {
        let Some(url) = result
            .url
            .as_deref()
            .map(str::trim)
            .filter(|u| !u.is_empty())
            .map(str::to_string)
        else {
            tracing::debug!("Dropping search result without URL");
            continue;
        };

        if !seen.insert(url.clone()) {
            tracing::debug!(%url, "Dropping duplicate search result");
            continue;
        }

        let title = result
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .or_else(|| result.meta(&["title", "ogTitle"]))
            .unwrap_or_else(|| url.clone());

        let description = result
            .description
            .clone()
            .or_else(|| result.meta(&["description", "ogDescription"]));

        documents.push(SourceDocument {
            published_date: result.meta(&["publishedTime", "publishedDate", "article:published_time"]),
            author: result.meta(&["author", "article:author"]),
            image: result.meta(&["ogImage", "image"]),
            site_name: result.meta(&["ogSiteName", "siteName"]),
            url,
            title,
            description,
            text: result.text,
            markdown: result.markdown,
        });
    }

    documents
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_drops_missing_blank_and_duplicate_urls() {
        let results = vec![
            SearchResult::new("https://a.example", "A", "alpha"),
            SearchResult {
                title: Some("no url".to_string()),
                ..Default::default()
            },
            SearchResult::new("   ", "blank", "x"),
            SearchResult::new("https://b.example", "B", "beta"),
            SearchResult::new("https://a.example", "A again", "dup"),
        ];

        let docs = documents_from_results(results);
        let urls: Vec<&str> = docs.iter().map(|d| d.url.as_str()).collect();
        assert_eq!(urls, vec!["https://a.example", "https://b.example"]);
        assert_eq!(docs[0].title, "A");
    }

    #[test]
    fn test_metadata_extraction() {
        let result = SearchResult {
            url: Some("https://news.example/story".to_string()),
            markdown: Some("# Story".to_string()),
            metadata: json!({
                "title": "Story title",
                "publishedTime": "2024-05-01",
                "ogImage": "https://news.example/img.png",
                "ogSiteName": "News",
                "author": ["Jane Doe"]
            }),
            ..Default::default()
        };

        let doc = documents_from_results(vec![result]).remove(0);
        assert_eq!(doc.title, "Story title");
        assert_eq!(doc.published_date.as_deref(), Some("2024-05-01"));
        assert_eq!(doc.image.as_deref(), Some("https://news.example/img.png"));
        assert_eq!(doc.site_name.as_deref(), Some("News"));
        assert_eq!(doc.author.as_deref(), Some("Jane Doe"));
    }

    #[test]
    fn test_title_falls_back_to_url() {
        let result = SearchResult {
            url: Some("https://x.example".to_string()),
            ..Default::default()
        };
        let doc = documents_from_results(vec![result]).remove(0);
        assert_eq!(doc.title, "https://x.example");
        assert_eq!(doc.content(), "");
    }

    #[test]
    fn test_content_prefers_markdown() {
        let mut doc = documents_from_results(vec![SearchResult::new("https://x", "X", "md")]).remove(0);
        doc.text = Some("plain".to_string());
        assert_eq!(doc.content(), "md");

        doc.markdown = None;
        assert_eq!(doc.content(), "plain");
    }

    #[test]
    fn test_serialization_is_camel_case() {
        let mut doc = documents_from_results(vec![SearchResult::new("https://x", "X", "md")]).remove(0);
        doc.site_name = Some("Example".to_string());
        let json = serde_json::to_value(&doc).unwrap();
        assert_eq!(json["siteName"], "Example");
        assert!(json.get("publishedDate").is_none());
    }
}
