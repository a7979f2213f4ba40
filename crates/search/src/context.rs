//! Numbered, citation-ready context assembly.

use crate::select::select_excerpt;
use crate::types::SourceDocument;

/// Separates the blocks of two documents.
pub const CONTEXT_DELIMITER: &str = "\n\n---\n\n";

/// Build the generation context for a set of documents.
///
/// Each document becomes one block, in input order:
///
/// ```text
/// [n] <title>
/// URL: <url>
/// <excerpt>
/// ```
///
/// `n` is the 1-based position of the document, which is the citation
/// number the answer must use. Documents without content keep their block.
pub fn build_context(documents: &[SourceDocument], query: &str, per_document_budget: usize) -> String {
    documents
        .iter()
        .enumerate()
        .map(|(index, doc)| {
            let excerpt = select_excerpt(doc.content(), query, per_document_budget);
            format!("[{}] {}\nURL: {}\n{}", index + 1, doc.title, doc.url, excerpt)
        })
        .collect::<Vec<_>>()
        .join(CONTEXT_DELIMITER)
}
