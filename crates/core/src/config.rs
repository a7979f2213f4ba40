//! Configuration management for Scout.
//!
//! This module handles loading and merging configuration from multiple sources:
//! - Defaults
//! - Config files (.scout/config.yaml)
//! - Environment variables
//! - Command-line flags
//!
//! It also owns credential resolution: a caller-supplied key always wins over
//! the server-side default sourced from the environment.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{AppError, AppResult};

/// Generation providers Scout knows how to talk to.
pub const KNOWN_PROVIDERS: [&str; 3] = ["openai", "ollama", "mock"];

/// Search providers Scout knows how to talk to.
pub const KNOWN_SEARCH_PROVIDERS: [&str; 2] = ["firecrawl", "mock"];

/// Default environment variable holding the generation provider key.
const DEFAULT_GENERATION_KEY_ENV: &str = "OPENAI_API_KEY";

/// Generation timeout when the provider entry sets none, in seconds.
pub const DEFAULT_GENERATION_TIMEOUT_SECS: u64 = 120;

/// Main application configuration.
///
/// This struct holds all global configuration options that affect
/// server and CLI behavior.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the workspace root (contains .scout/)
    pub workspace: PathBuf,

    /// Optional config file path
    pub config_file: Option<PathBuf>,

    /// Active generation provider (e.g., "openai", "ollama", "mock")
    pub provider: String,

    /// Default model identifier
    pub model: String,

    /// Explicit API key for the generation provider
    #[serde(skip_serializing)]
    pub api_key: Option<String>,

    /// Log level override
    pub log_level: Option<String>,

    /// Log line format ("pretty" or "json")
    pub log_format: String,

    /// Verbose mode (enables debug logging)
    pub verbose: bool,

    /// Disable colored output
    pub no_color: bool,

    /// Generation provider configurations
    pub llm: Option<LlmConfig>,

    /// Search provider settings
    pub search: SearchConfig,

    /// Answer pipeline tuning
    pub answer: AnswerConfig,

    /// HTTP server settings
    pub server: ServerConfig,
}

/// LLM configuration from config.yaml.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(rename = "activeProvider")]
    pub active_provider: String,

    pub providers: HashMap<String, ProviderConfig>,
}

/// Provider-specific configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ProviderConfig {
    /// Any OpenAI-compatible chat completions endpoint
    OpenAI {
        #[serde(rename = "apiKeyEnv")]
        api_key_env: String,
        model: String,
        endpoint: Option<String>,
        /// Whole-request timeout in seconds, streamed answer included
        timeout: Option<u64>,
    },
    Ollama {
        endpoint: String,
        model: String,
        timeout: Option<u64>,
    },
}

/// Search provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchConfig {
    /// Search provider ("firecrawl" or "mock")
    #[serde(default = "default_search_provider")]
    pub provider: String,

    /// Custom API endpoint
    #[serde(default)]
    pub endpoint: Option<String>,

    /// Environment variable holding the default key
    #[serde(default = "default_search_key_env")]
    pub api_key_env: String,

    /// Maximum number of documents retrieved per turn
    #[serde(default = "default_search_limit")]
    pub limit: u32,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_search_provider() -> String {
    "firecrawl".to_string()
}

fn default_search_key_env() -> String {
    "FIRECRAWL_API_KEY".to_string()
}

fn default_search_limit() -> u32 {
    6
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            provider: default_search_provider(),
            endpoint: None,
            api_key_env: default_search_key_env(),
            limit: default_search_limit(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Answer pipeline tuning.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnswerConfig {
    /// Character budget for the excerpt taken from each document
    #[serde(default = "default_per_document_budget")]
    pub per_document_budget: usize,

    /// Pause after emitting sources so clients can render them
    #[serde(default = "default_sources_delay_ms")]
    pub sources_delay_ms: u64,

    /// Sampling temperature for the answer
    #[serde(default)]
    pub temperature: Option<f32>,

    /// Maximum tokens for the answer
    #[serde(default)]
    pub max_tokens: Option<u32>,
}

fn default_per_document_budget() -> usize {
    2000
}

fn default_sources_delay_ms() -> u64 {
    150
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            per_document_budget: default_per_document_budget(),
            sources_delay_ms: default_sources_delay_ms(),
            temperature: None,
            max_tokens: None,
        }
    }
}

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    /// Socket address to bind
    #[serde(default = "default_bind")]
    pub bind: String,

    /// Origins allowed by CORS (empty allows any origin)
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

fn default_bind() -> String {
    "127.0.0.1:3000".to_string()
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            allowed_origins: Vec::new(),
        }
    }
}

/// Full configuration file structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ConfigFile {
    llm: Option<LlmConfig>,
    search: Option<SearchConfig>,
    answer: Option<AnswerConfig>,
    server: Option<ServerConfig>,
    workspace: Option<WorkspaceConfig>,
    logging: Option<LoggingConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct WorkspaceConfig {
    path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct LoggingConfig {
    level: Option<String>,
    color: Option<bool>,
    format: Option<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            workspace: std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")),
            config_file: None,
            provider: "ollama".to_string(), // Local-first default
            model: "llama3.2".to_string(),
            api_key: None,
            log_level: None,
            log_format: "pretty".to_string(),
            verbose: false,
            no_color: false,
            llm: None,
            search: SearchConfig::default(),
            answer: AnswerConfig::default(),
            server: ServerConfig::default(),
        }
    }
}

impl AppConfig {
    /// Load configuration from environment variables and defaults.
    ///
    /// Environment variables:
    /// - `SCOUT_WORKSPACE`: Override workspace path
    /// - `SCOUT_CONFIG`: Path to config file
    /// - `SCOUT_PROVIDER`: Generation provider
    /// - `SCOUT_MODEL`: Model identifier
    /// - `SCOUT_API_KEY`: Generation provider API key
    /// - `SCOUT_SEARCH_PROVIDER`: Search provider
    /// - `SCOUT_BIND`: Server bind address
    /// - `RUST_LOG`: Log level
    /// - `NO_COLOR`: Disable colored output
    ///
    /// # Example
    /// ```no_run
    /// use scout_core::config::AppConfig;
    ///
    /// let config = AppConfig::load().expect("Failed to load config");
    /// println!("Workspace: {:?}", config.workspace);
    /// ```
    pub fn load() -> AppResult<Self> {
        Self::load_from(None, None)
    }

    /// Like [`AppConfig::load`], with an explicit workspace and config file
    /// taking precedence over `SCOUT_WORKSPACE` and `SCOUT_CONFIG`.
    pub fn load_from(workspace: Option<PathBuf>, config_file: Option<PathBuf>) -> AppResult<Self> {
        let mut config = Self::default();

        if let Some(workspace) = workspace.or_else(|| std::env::var("SCOUT_WORKSPACE").ok().map(PathBuf::from)) {
            config.workspace = workspace;
        }

        if let Some(config_file) = config_file.or_else(|| std::env::var("SCOUT_CONFIG").ok().map(PathBuf::from)) {
            config.config_file = Some(config_file);
        }

        if !config.workspace.exists() {
            return Err(AppError::Config(format!(
                "Workspace directory does not exist: {:?}",
                config.workspace
            )));
        }

        let config_path = config
            .config_file
            .clone()
            .unwrap_or_else(|| config.workspace.join(".scout/config.yaml"));

        if config_path.exists() {
            config = config.merge_yaml(&config_path)?;
        }

        // Environment variables override YAML config
        if let Ok(provider) = std::env::var("SCOUT_PROVIDER") {
            config.provider = provider;
        }

        if let Ok(model) = std::env::var("SCOUT_MODEL") {
            config.model = model;
        }

        if let Ok(search_provider) = std::env::var("SCOUT_SEARCH_PROVIDER") {
            config.search.provider = search_provider;
        }

        if let Ok(bind) = std::env::var("SCOUT_BIND") {
            config.server.bind = bind;
        }

        config.api_key = std::env::var("SCOUT_API_KEY").ok();
        if let Ok(level) = std::env::var("RUST_LOG") {
            config.log_level = Some(level);
        }

        if std::env::var("NO_COLOR").is_ok() {
            config.no_color = true;
        }

        Ok(config)
    }

    /// Merge YAML configuration file into this config.
    fn merge_yaml(&self, path: &Path) -> AppResult<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            AppError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config_file: ConfigFile = serde_yaml::from_str(&contents).map_err(|e| {
            AppError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;

        let mut result = self.clone();

        if let Some(ws) = config_file.workspace {
            if let Some(path) = ws.path {
                result.workspace = PathBuf::from(path);
            }
        }

        if let Some(logging) = config_file.logging {
            if let Some(level) = logging.level {
                result.log_level = Some(level);
            }
            if let Some(color) = logging.color {
                result.no_color = !color;
            }
            if let Some(format) = logging.format {
                result.log_format = format;
            }
        }

        if let Some(search) = config_file.search {
            result.search = search;
        }

        if let Some(answer) = config_file.answer {
            result.answer = answer;
        }

        if let Some(server) = config_file.server {
            result.server = server;
        }

        if let Some(llm) = config_file.llm {
            result.provider = llm.active_provider.clone();

            if let Some(provider_config) = llm.providers.get(&llm.active_provider) {
                result.model = match provider_config {
                    ProviderConfig::OpenAI { model, .. } => model.clone(),
                    ProviderConfig::Ollama { model, .. } => model.clone(),
                };
            }

            result.llm = Some(llm);
        }

        Ok(result)
    }

    /// Apply CLI overrides to the configuration.
    ///
    /// This method merges command-line flags with the loaded configuration,
    /// giving precedence to CLI flags over environment variables.
    #[allow(clippy::too_many_arguments)]
    pub fn with_overrides(
        mut self,
        workspace: Option<PathBuf>,
        config_file: Option<PathBuf>,
        provider: Option<String>,
        model: Option<String>,
        log_level: Option<String>,
        log_format: Option<String>,
        verbose: bool,
        no_color: bool,
    ) -> Self {
        if let Some(workspace) = workspace {
            self.workspace = workspace;
        }

        if let Some(config_file) = config_file {
            self.config_file = Some(config_file);
        }

        if let Some(provider) = provider {
            self.provider = provider;
        }

        if let Some(model) = model {
            self.model = model;
        }

        if let Some(log_level) = log_level {
            self.log_level = Some(log_level);
        }

        if let Some(log_format) = log_format {
            self.log_format = log_format;
        }

        if verbose {
            self.verbose = true;
            // Verbose mode implies debug logging
            if self.log_level.is_none() {
                self.log_level = Some("debug".to_string());
            }
        }

        if no_color {
            self.no_color = true;
        }

        self
    }

    /// Get the path to the .scout directory.
    pub fn scout_dir(&self) -> PathBuf {
        self.workspace.join(".scout")
    }

    /// Get the configuration for a generation provider.
    pub fn get_provider_config(&self, provider: &str) -> Option<&ProviderConfig> {
        self.llm
            .as_ref()
            .and_then(|llm| llm.providers.get(provider))
    }

    /// Endpoint configured for the active generation provider.
    pub fn generation_endpoint(&self) -> Option<&str> {
        match self.get_provider_config(&self.provider)? {
            ProviderConfig::OpenAI { endpoint, .. } => endpoint.as_deref(),
            ProviderConfig::Ollama { endpoint, .. } => Some(endpoint.as_str()),
        }
    }

    /// Request timeout for the active generation provider.
    pub fn generation_timeout(&self) -> Duration {
        let configured = match self.get_provider_config(&self.provider) {
            Some(ProviderConfig::OpenAI { timeout, .. }) => *timeout,
            Some(ProviderConfig::Ollama { timeout, .. }) => *timeout,
            None => None,
        };
        Duration::from_secs(configured.unwrap_or(DEFAULT_GENERATION_TIMEOUT_SECS))
    }

    /// Whether the active generation provider needs an API key.
    pub fn generation_requires_key(&self) -> bool {
        self.provider.eq_ignore_ascii_case("openai")
    }

    /// Whether the active search provider needs an API key.
    pub fn search_requires_key(&self) -> bool {
        self.search.provider.eq_ignore_ascii_case("firecrawl")
    }

    /// Resolve the generation provider key.
    ///
    /// Precedence: caller-supplied key, `SCOUT_API_KEY`, then the provider's
    /// `apiKeyEnv` variable (default `OPENAI_API_KEY`).
    pub fn resolve_generation_key(&self, caller_key: Option<&str>) -> AppResult<Option<String>> {
        if let Some(key) = non_blank(caller_key) {
            return Ok(Some(key));
        }

        if !self.generation_requires_key() {
            return Ok(None);
        }

        if let Some(key) = non_blank(self.api_key.as_deref()) {
            return Ok(Some(key));
        }

        let env_var = match self.get_provider_config(&self.provider) {
            Some(ProviderConfig::OpenAI { api_key_env, .. }) => api_key_env.as_str(),
            _ => DEFAULT_GENERATION_KEY_ENV,
        };

        env_key(env_var)
            .map(Some)
            .ok_or(AppError::MissingGenerationCredential)
    }

    /// Resolve the search provider key.
    ///
    /// Precedence: caller-supplied key, then the `search.apiKeyEnv` variable.
    pub fn resolve_search_key(&self, caller_key: Option<&str>) -> AppResult<Option<String>> {
        if let Some(key) = non_blank(caller_key) {
            return Ok(Some(key));
        }

        if !self.search_requires_key() {
            return Ok(None);
        }

        env_key(&self.search.api_key_env)
            .map(Some)
            .ok_or(AppError::MissingSearchCredential)
    }

    /// Validate configuration for the active providers.
    pub fn validate(&self) -> AppResult<()> {
        let provider = self.provider.to_lowercase();
        if !KNOWN_PROVIDERS.contains(&provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown provider: {}. Supported: {}",
                self.provider,
                KNOWN_PROVIDERS.join(", ")
            )));
        }

        let search_provider = self.search.provider.to_lowercase();
        if !KNOWN_SEARCH_PROVIDERS.contains(&search_provider.as_str()) {
            return Err(AppError::Config(format!(
                "Unknown search provider: {}. Supported: {}",
                self.search.provider,
                KNOWN_SEARCH_PROVIDERS.join(", ")
            )));
        }

        if self.search.limit == 0 {
            return Err(AppError::Config(
                "search.limit must be at least 1".to_string(),
            ));
        }

        if self.answer.per_document_budget == 0 {
            return Err(AppError::Config(
                "answer.perDocumentBudget must be at least 1".to_string(),
            ));
        }

        Ok(())
    }
}

fn non_blank(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn env_key(name: &str) -> Option<String> {
    non_blank(std::env::var(name).ok().as_deref())
}
