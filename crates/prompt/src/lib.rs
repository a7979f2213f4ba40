//! Prompt system for Scout.
//!
//! This crate provides structured prompt management with:
//! - YAML-based prompt definitions, built in and overridable per workspace
//! - Handlebars template rendering

pub mod builder;
pub mod loader;
pub mod types;

// Re-export main types
pub use builder::build_prompt;
pub use loader::{
    list_prompts, load_prompt, PromptLibrary, ANSWER_FOLLOWUP, ANSWER_INITIAL, FOLLOWUPS_GENERATE,
};
pub use types::{
    BuiltPrompt, BuiltPromptMetadata, PromptDefinition, PromptOrigin, PromptOutputSpec,
    PromptSummary,
};
