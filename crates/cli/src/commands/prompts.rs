//! Prompts command handler.

use clap::Args;
use scout_core::{config::AppConfig, AppResult};
use scout_prompt::list_prompts;

/// List available prompts
#[derive(Args, Debug)]
pub struct PromptsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl PromptsCommand {
    pub fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let prompts = list_prompts(&config.workspace)?;

        if self.json {
            println!("{}", serde_json::to_string_pretty(&prompts)?);
            return Ok(());
        }

        for prompt in prompts {
            println!("{:<22} {:<10} {}", prompt.id, prompt.origin.as_str(), prompt.title);
        }

        Ok(())
    }
}
