//! Serve command handler.

use clap::Args;
use scout_core::{config::AppConfig, AppResult};

/// Run the HTTP server
#[derive(Args, Debug)]
pub struct ServeCommand {
    /// Address to bind (default from config, 127.0.0.1:3000)
    #[arg(long, env = "SCOUT_BIND")]
    pub bind: Option<String>,
}

impl ServeCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        let mut config = config.clone();
        if let Some(bind) = &self.bind {
            config.server.bind = bind.clone();
        }

        scout_server::serve(&config).await
    }
}
