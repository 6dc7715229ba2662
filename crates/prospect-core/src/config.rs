//! Prospect Configuration Management
//!
//! Handles configuration from environment variables and TOML files
//! with sensible defaults for development.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    /// Server configuration
    pub server: ServerConfig,

    /// Upstream AI search provider
    pub upstream: UpstreamConfig,

    /// Retry policy for upstream calls
    pub retry: RetryConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        // Server
        if let Ok(host) = std::env::var("API_HOST") {
            config.server.host = host;
        }
        if let Ok(port) = std::env::var("API_PORT") {
            config.server.port = parse_var("API_PORT", port)?;
        }

        // CORS origins from environment variable (comma-separated)
        if let Ok(origins) = std::env::var("CORS_ORIGINS") {
            config.server.cors_origins = origins
                .split(',')
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect();
        }

        // Upstream
        if let Ok(key) = std::env::var("PERPLEXITY_API_KEY") {
            if !key.is_empty() {
                config.upstream.api_key = Some(key);
            }
        }
        if let Ok(url) = std::env::var("PERPLEXITY_BASE_URL") {
            config.upstream.base_url = url;
        }
        if let Ok(model) = std::env::var("UPSTREAM_MODEL") {
            config.upstream.model = model;
        }
        if let Ok(secs) = std::env::var("UPSTREAM_TIMEOUT_SECS") {
            config.upstream.timeout_secs = parse_var("UPSTREAM_TIMEOUT_SECS", secs)?;
        }

        // Retry
        if let Ok(retries) = std::env::var("UPSTREAM_MAX_RETRIES") {
            config.retry.max_retries = parse_var("UPSTREAM_MAX_RETRIES", retries)?;
        }

        // Logging
        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.logging.level = level;
        }
        if let Ok(json) = std::env::var("LOG_JSON") {
            config.logging.json_format = parse_var("LOG_JSON", json)?;
        }

        Ok(config)
    }

    /// Load from a TOML file
    pub fn from_file(path: impl Into<PathBuf>) -> Result<Self, ConfigError> {
        let path = path.into();
        let content = std::fs::read_to_string(&path).map_err(|e| ConfigError::FileReadError {
            path: path.clone(),
            source: e,
        })?;

        Self::from_toml_str(&content).map_err(|message| ConfigError::ParseError { path, message })
    }

    fn from_toml_str(content: &str) -> Result<Self, String> {
        toml::from_str(content).map_err(|e| e.to_string())
    }

    /// Merge with environment variables (env takes precedence)
    pub fn with_env_override(self) -> Result<Self, ConfigError> {
        let env_config = Self::from_env()?;
        Ok(self.merge_env(env_config, |key| std::env::var_os(key).is_some()))
    }

    /// Overlay values read by [`AppConfig::from_env`]; `is_set` reports
    /// which variables were present
    fn merge_env(mut self, env_config: AppConfig, is_set: impl Fn(&str) -> bool) -> Self {

        // Only override if env values differ from defaults
        if env_config.server.host != ServerConfig::default().host {
            self.server.host = env_config.server.host;
        }
        if env_config.server.port != ServerConfig::default().port {
            self.server.port = env_config.server.port;
        }
        if !env_config.server.cors_origins.is_empty() {
            self.server.cors_origins = env_config.server.cors_origins;
        }

        let upstream_default = UpstreamConfig::default();
        if env_config.upstream.base_url != upstream_default.base_url {
            self.upstream.base_url = env_config.upstream.base_url;
        }
        if env_config.upstream.model != upstream_default.model {
            self.upstream.model = env_config.upstream.model;
        }
        if env_config.upstream.timeout_secs != upstream_default.timeout_secs {
            self.upstream.timeout_secs = env_config.upstream.timeout_secs;
        }
        if env_config.retry.max_retries != RetryConfig::default().max_retries {
            self.retry.max_retries = env_config.retry.max_retries;
        }

        // Always use env for sensitive values
        if env_config.upstream.api_key.is_some() {
            self.upstream.api_key = env_config.upstream.api_key;
        }

        // Logging follows presence, not difference from defaults
        if is_set("LOG_LEVEL") {
            self.logging.level = env_config.logging.level;
        }
        if is_set("LOG_JSON") {
            self.logging.json_format = env_config.logging.json_format;
        }

        self
    }
}

fn parse_var<T: std::str::FromStr>(key: &str, value: String) -> Result<T, ConfigError> {
    value.parse().map_err(|_| ConfigError::InvalidValue {
        key: key.to_string(),
        value,
    })
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,

    /// Port to listen on
    pub port: u16,

    /// Request timeout in seconds
    pub request_timeout_secs: u64,

    /// Maximum request body size in bytes
    pub max_body_size: usize,

    /// Allowed origins for CORS (empty or `*` allows any)
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            request_timeout_secs: 120,
            max_body_size: 64 * 1024,
            cors_origins: vec![],
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Upstream chat-completion provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Bearer token for the provider
    pub api_key: Option<String>,

    /// API base URL (the client appends `/chat/completions`)
    pub base_url: String,

    /// Model name to use
    pub model: String,

    /// Maximum tokens for completion
    pub max_tokens: u32,

    /// Temperature for generation
    pub temperature: f32,

    /// Per-attempt timeout in seconds
    pub timeout_secs: u64,
}

impl UpstreamConfig {
    /// The API key, or an error naming the variable that supplies it
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or_else(|| ConfigError::MissingRequired("PERPLEXITY_API_KEY".to_string()))
    }
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.perplexity.ai".to_string(),
            model: "sonar".to_string(),
            max_tokens: 800,
            temperature: 0.1,
            timeout_secs: 30,
        }
    }
}

/// Retry policy for upstream calls
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig {
    /// Attempts after the first one
    pub max_retries: usize,

    pub initial_backoff_ms: u64,

    pub max_backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: 2,
            initial_backoff_ms: 500,
            max_backoff_ms: 4000,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// JSON format for logs
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json_format: false,
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    FileReadError {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),
}
