//! Search provider implementations.

pub mod firecrawl;
pub mod mock;

pub use firecrawl::FirecrawlClient;
pub use mock::MockSearch;
