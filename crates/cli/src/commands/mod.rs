//! Command handlers for the Scout CLI.

pub mod ask;
pub mod prompts;
pub mod serve;

// Re-export command types for convenience
pub use ask::AskCommand;
pub use prompts::PromptsCommand;
pub use serve::ServeCommand;
