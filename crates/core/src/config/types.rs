use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Root configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub llm: LlmConfig,
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub content: ContentConfig,
}

/// Server configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> IpAddr {
    "0.0.0.0".parse().unwrap()
}

fn default_port() -> u16 {
    8080
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default = "default_db_path")]
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
        }
    }
}

fn default_db_path() -> PathBuf {
    PathBuf::from("learncrafter.db")
}

/// LLM provider configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LlmConfig {
    /// Which completion backend to use
    pub provider: LlmProvider,
    /// Model name (provider-specific default when omitted)
    #[serde(default)]
    pub model: Option<String>,
    /// API key (required for anthropic)
    #[serde(default)]
    pub api_key: Option<String>,
    /// Override the provider base URL (e.g., a local Ollama instance)
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
    /// Pause inserted before planning calls to stay inside shared rate limits
    #[serde(default = "default_request_delay_secs")]
    pub request_delay_secs: f64,
}

/// Available completion backends
#[derive(Debug, Clone, Copy, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum LlmProvider {
    Anthropic,
    Ollama,
}

fn default_max_tokens() -> u32 {
    4096
}

fn default_temperature() -> f32 {
    0.7
}

fn default_request_delay_secs() -> f64 {
    45.0
}

/// Generated-content limits
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ContentConfig {
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            max_content_length: default_max_content_length(),
        }
    }
}

fn default_max_content_length() -> usize {
    50_000
}

/// Sanitized config for API responses and startup logs (secrets redacted)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedConfig {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub llm: SanitizedLlmConfig,
    pub content: ContentConfig,
}

/// Sanitized LLM config (API key hidden)
#[derive(Debug, Clone, Serialize)]
pub struct SanitizedLlmConfig {
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub api_key_configured: bool,
    pub max_tokens: u32,
    pub temperature: f32,
    pub request_delay_secs: f64,
}

impl From<&Config> for SanitizedConfig {
    fn from(config: &Config) -> Self {
        Self {
            server: config.server.clone(),
            database: config.database.clone(),
            llm: SanitizedLlmConfig {
                provider: match config.llm.provider {
                    LlmProvider::Anthropic => "anthropic".to_string(),
                    LlmProvider::Ollama => "ollama".to_string(),
                },
                model: config.llm.model.clone(),
                api_key_configured: config
                    .llm
                    .api_key
                    .as_ref()
                    .is_some_and(|k| !k.is_empty()),
                max_tokens: config.llm.max_tokens,
                temperature: config.llm.temperature,
                request_delay_secs: config.llm.request_delay_secs,
            },
            content: config.content.clone(),
        }
    }
}
