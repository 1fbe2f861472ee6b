//! Configuration loading and validation for HelpBot.
//!
//! Loads configuration from a TOML file with environment variable
//! overrides. The model API credential is read once at startup; serving
//! commands treat its absence as fatal rather than failing per-request.

use helpbot_core::error::Error;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Environment variable holding the Anthropic API credential.
pub const API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

/// The root configuration structure.
#[derive(Clone, Serialize, Deserialize, Default)]
pub struct AppConfig {
    /// Model API key; the ANTHROPIC_API_KEY env var takes precedence.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Agent / model settings
    #[serde(default)]
    pub agent: AgentConfig,

    /// Retrieval settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Gateway settings
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl AppConfig {
    /// Load configuration.
    ///
    /// With a path, the file must exist and parse; without one, defaults
    /// are used. The env override is applied in both cases.
    pub fn load(path: Option<&Path>) -> Result<Self, Error> {
        let mut config = match path {
            Some(path) => {
                let raw = std::fs::read_to_string(path).map_err(|e| Error::Config {
                    message: format!("cannot read {}: {e}", path.display()),
                })?;
                toml::from_str(&raw).map_err(|e| Error::Config {
                    message: format!("cannot parse {}: {e}", path.display()),
                })?
            }
            None => Self::default(),
        };

        if let Ok(key) = std::env::var(API_KEY_ENV)
            && !key.is_empty()
        {
            config.api_key = Some(key);
        }

        Ok(config)
    }

    /// The API credential, or a startup-fatal configuration error.
    pub fn require_api_key(&self) -> Result<String, Error> {
        self.api_key.clone().ok_or_else(|| Error::Config {
            message: format!("no model API key configured; set {API_KEY_ENV} or api_key in the config file"),
        })
    }
}

fn redact(s: &Option<String>) -> &'static str {
    match s {
        Some(_) => "[REDACTED]",
        None => "None",
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("api_key", &redact(&self.api_key))
            .field("agent", &self.agent)
            .field("retrieval", &self.retrieval)
            .field("gateway", &self.gateway)
            .finish()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_max_tool_rounds")]
    pub max_tool_rounds: u32,

    #[serde(default)]
    pub retry: RetryConfig,
}

fn default_model() -> String {
    "claude-3-5-sonnet-20240620".into()
}
fn default_temperature() -> f32 {
    0.2
}
fn default_max_tokens() -> u32 {
    500
}
fn default_max_tool_rounds() -> u32 {
    5
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            model: default_model(),
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            max_tool_rounds: default_max_tool_rounds(),
            retry: RetryConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_initial_backoff_ms")]
    pub initial_backoff_ms: u64,
}

fn default_max_retries() -> u32 {
    3
}
fn default_initial_backoff_ms() -> u64 {
    500
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            initial_backoff_ms: default_initial_backoff_ms(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    #[serde(default = "default_index_path")]
    pub index_path: String,

    #[serde(default = "default_top_k")]
    pub top_k: usize,

    #[serde(default = "default_embedding_dimension")]
    pub embedding_dimension: usize,

    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

fn default_index_path() -> String {
    "knowledge_index.json".into()
}
fn default_top_k() -> usize {
    3
}
fn default_embedding_dimension() -> usize {
    256
}
fn default_chunk_size() -> usize {
    500
}
fn default_chunk_overlap() -> usize {
    100
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            index_path: default_index_path(),
            top_k: default_top_k(),
            embedding_dimension: default_embedding_dimension(),
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".into()
}
fn default_port() -> u16 {
    8080
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
