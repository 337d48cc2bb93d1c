//! TOML configuration for switchboard
//!
//! The assistant is configured from a single file (`switchboard.toml` by
//! default). Secrets never live in the file: each section names the
//! environment variable that holds its key, resolved at startup.

use crate::llm::Provider;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "switchboard.toml";

/// Root configuration structure loaded from switchboard.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SwitchboardConfig {
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Language model used for routing and by the sub-agents
    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub weather: WeatherConfig,

    #[serde(default)]
    pub images: ImagesConfig,

    #[serde(default)]
    pub search: SearchConfig,

    /// Local store files
    #[serde(default)]
    pub database: DatabaseConfig,

    /// Files indexed for document questions
    #[serde(default)]
    pub documents: DocumentsConfig,

    #[serde(default)]
    pub agent: AgentConfig,
}

// ============= Logging Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default)]
    pub format: LogFormat,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: LogFormat::default(),
        }
    }
}

// ============= LLM Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderKind {
    #[default]
    OpenAI,
    Ollama,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: LlmProviderKind,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    #[serde(default = "default_openai_base")]
    pub api_base: String,
    #[serde(default = "default_openai_key_env")]
    pub api_key_env: String,
    #[serde(default = "default_ollama_url")]
    pub ollama_url: String,
}

fn default_model() -> String {
    "gpt-4-turbo".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_openai_base() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_openai_key_env() -> String {
    "OPENAI_API_KEY".to_string()
}

fn default_ollama_url() -> String {
    "http://localhost:11434".to_string()
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: LlmProviderKind::default(),
            model: default_model(),
            temperature: default_temperature(),
            api_base: default_openai_base(),
            api_key_env: default_openai_key_env(),
            ollama_url: default_ollama_url(),
        }
    }
}

// ============= Service Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherConfig {
    #[serde(default = "default_weather_url")]
    pub base_url: String,
    #[serde(default = "default_weather_key_env")]
    pub api_key_env: String,
}

fn default_weather_url() -> String {
    "https://api.weatherapi.com/v1".to_string()
}

fn default_weather_key_env() -> String {
    "WEATHER_API_KEY".to_string()
}

impl Default for WeatherConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_url(),
            api_key_env: default_weather_key_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagesConfig {
    #[serde(default = "default_openai_base")]
    pub base_url: String,
    #[serde(default = "default_image_model")]
    pub model: String,
    #[serde(default = "default_image_size")]
    pub size: String,
    #[serde(default = "default_openai_key_env")]
    pub api_key_env: String,
}

fn default_image_model() -> String {
    "dall-e-3".to_string()
}

fn default_image_size() -> String {
    "1024x1024".to_string()
}

impl Default for ImagesConfig {
    fn default() -> Self {
        Self {
            base_url: default_openai_base(),
            model: default_image_model(),
            size: default_image_size(),
            api_key_env: default_openai_key_env(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    #[serde(default = "default_num_results")]
    pub num_results: usize,
}

fn default_num_results() -> usize {
    5
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            num_results: default_num_results(),
        }
    }
}

// ============= Store Configuration =============

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_company_path")]
    pub company_path: PathBuf,
    #[serde(default = "default_events_path")]
    pub events_path: PathBuf,
}

fn default_company_path() -> PathBuf {
    PathBuf::from("company.db")
}

fn default_events_path() -> PathBuf {
    PathBuf::from("events.db")
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            company_path: default_company_path(),
            events_path: default_events_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentsConfig {
    #[serde(default)]
    pub paths: Vec<PathBuf>,
    /// Window length in whitespace-separated words
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,
    /// Words shared by consecutive windows
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

fn default_chunk_size() -> usize {
    100
}

fn default_chunk_overlap() -> usize {
    20
}

fn default_top_k() -> usize {
    4
}

impl Default for DocumentsConfig {
    fn default() -> Self {
        Self {
            paths: Vec::new(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
            top_k: default_top_k(),
        }
    }
}

// ============= Agent Configuration =============

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RoutingMode {
    /// Routing decisions come from the language model
    #[default]
    Llm,
    /// Deterministic keyword routing, no model call
    Rules,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Maximum tool invocations per user message
    #[serde(default = "default_turn_budget")]
    pub turn_budget: usize,
    #[serde(default)]
    pub routing: RoutingMode,
    /// Number of recent turns included in prompts
    #[serde(default = "default_history_window")]
    pub history_window: usize,
}

fn default_turn_budget() -> usize {
    crate::agents::DEFAULT_TURN_BUDGET
}

fn default_history_window() -> usize {
    crate::memory::DEFAULT_HISTORY_WINDOW
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            turn_budget: default_turn_budget(),
            routing: RoutingMode::default(),
            history_window: default_history_window(),
        }
    }
}

// ============= Configuration Loading & Validation =============

/// Errors that can occur during configuration loading
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read configuration file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse TOML: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize configuration: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Environment variable '{0}' referenced in config is not set")]
    MissingEnvVar(String),
}

impl SwitchboardConfig {
    /// Parse a TOML file without validating it.
    ///
    /// Commands that never reach an external service (seeding, printing the
    /// configuration) use this so they work without API keys.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(ConfigError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Validate value ranges and the availability of required secrets
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=10).contains(&self.agent.turn_budget) {
            return Err(ConfigError::ValidationError(format!(
                "agent.turn_budget must be between 1 and 10, got {}",
                self.agent.turn_budget
            )));
        }

        if self.agent.history_window == 0 {
            return Err(ConfigError::ValidationError(
                "agent.history_window must be at least 1".to_string(),
            ));
        }

        if self.documents.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "documents.chunk_size must be at least 1".to_string(),
            ));
        }

        if self.documents.chunk_overlap >= self.documents.chunk_size {
            return Err(ConfigError::ValidationError(format!(
                "documents.chunk_overlap ({}) must be smaller than documents.chunk_size ({})",
                self.documents.chunk_overlap, self.documents.chunk_size
            )));
        }

        self.validate_env_var(&self.weather.api_key_env)?;

        if self.llm.provider == LlmProviderKind::OpenAI && self.agent.routing == RoutingMode::Llm {
            self.validate_env_var(&self.llm.api_key_env)?;
        }

        Ok(())
    }

    fn validate_env_var(&self, name: &str) -> Result<(), ConfigError> {
        self.resolve_env(name)
            .map(|_| ())
            .ok_or_else(|| ConfigError::MissingEnvVar(name.to_string()))
    }

    /// Get a resolved value from an env var reference
    pub fn resolve_env(&self, env_name: &str) -> Option<String> {
        std::env::var(env_name).ok().filter(|v| !v.is_empty())
    }

    /// Get the weather API key from the environment
    pub fn weather_api_key(&self) -> Result<String, ConfigError> {
        self.resolve_env(&self.weather.api_key_env)
            .ok_or_else(|| ConfigError::MissingEnvVar(self.weather.api_key_env.clone()))
    }

    /// Get the image API key from the environment, empty when unset
    pub fn image_api_key(&self) -> String {
        self.resolve_env(&self.images.api_key_env).unwrap_or_default()
    }

    /// The LLM provider described by the `[llm]` section
    pub fn provider(&self) -> Provider {
        match self.llm.provider {
            LlmProviderKind::OpenAI => Provider::OpenAI {
                api_key: self.resolve_env(&self.llm.api_key_env).unwrap_or_default(),
                api_base: self.llm.api_base.clone(),
                model: self.llm.model.clone(),
                temperature: self.llm.temperature,
            },
            LlmProviderKind::Ollama => Provider::Ollama {
                base_url: self.llm.ollama_url.clone(),
                model: self.llm.model.clone(),
            },
        }
    }

    /// The effective configuration as TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }
}
