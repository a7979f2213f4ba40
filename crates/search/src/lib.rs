//! Web retrieval for Scout.
//!
//! Provides the search provider boundary and the pure text utilities that
//! turn retrieved documents into citation-ready generation context:
//! - [`select`]: query-relevant excerpt selection under a length budget
//! - [`entity`]: symbol detection from free text
//! - [`context`]: numbered context assembly

pub mod context;
pub mod entity;
pub mod provider;
pub mod providers;
pub mod select;
pub mod types;


// Re-export commonly used types
pub use context::{build_context, CONTEXT_DELIMITER};
pub use entity::detect_symbol;
pub use provider::{create_search_provider, SearchProvider};
pub use providers::{FirecrawlClient, MockSearch};
pub use select::{query_terms, select_excerpt};
pub use types::{documents_from_results, SearchOptions, SearchResult, SourceDocument};
