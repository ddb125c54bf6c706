//! Configuration module for the agent gateway
//!
//! This module handles server configuration from various sources: .env files, YAML files,
//! and environment variables. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `yaml`: YAML configuration file loading
//! - `env`: Environment variable loading
//! - `merge`: Merging YAML and environment configurations
//! - `validation`: Configuration validation logic
//! - `utils`: Utility functions for configuration parsing
//!
//! # Example
//! ```rust,no_run
//! use agent_gateway::config::ServerConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ServerConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("config.yaml");
//! let config = ServerConfig::from_file(&config_path)?;
//!
//! println!("Server listening on {}", config.address());
//! # Ok(())
//! # }
//! ```

use std::path::PathBuf;

mod env;
mod merge;
mod utils;
mod validation;
mod yaml;

/// Default ZEGO AI-agent REST endpoint
pub const DEFAULT_ZEGO_API_BASE_URL: &str = "https://aigc-aiagent-api.zegotech.cn";
/// Default OpenAI-compatible upstream (DashScope compatible mode)
pub const DEFAULT_LLM_BASE_URL: &str = "https://dashscope.aliyuncs.com/compatible-mode/v1";
pub const DEFAULT_LLM_MODEL: &str = "qwen-plus";
pub const DEFAULT_AGENT_ID: &str = "ai_agent_default";
pub const DEFAULT_AGENT_NAME: &str = "AI Assistant";
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are a friendly voice assistant. \
     Answer in short, natural sentences suitable for being spoken aloud.";

/// TLS configuration for HTTPS
#[derive(Debug, Clone)]
pub struct TlsConfig {
    /// Path to the TLS certificate file (PEM format)
    pub cert_path: PathBuf,
    /// Path to the TLS private key file (PEM format)
    pub key_path: PathBuf,
}

/// API secret authentication entry with a client identifier
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthApiSecret {
    pub id: String,
    pub secret: String,
}

/// Settings used when registering the agent with the vendor
///
/// `tts` and `asr` are opaque vendor blocks forwarded as-is.
#[derive(Debug, Clone, PartialEq)]
pub struct AgentConfig {
    pub id: String,
    pub name: String,
    pub system_prompt: String,
    pub temperature: f32,
    pub top_p: f32,
    pub tts: serde_json::Value,
    pub asr: Option<serde_json::Value>,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            id: DEFAULT_AGENT_ID.to_string(),
            name: DEFAULT_AGENT_NAME.to_string(),
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            temperature: 0.8,
            top_p: 0.6,
            tts: default_tts(),
            asr: None,
        }
    }
}

fn default_tts() -> serde_json::Value {
    serde_json::json!({
        "Vendor": "ByteDance",
        "Params": {
            "app": { "appid": "zego_test", "token": "zego_test", "cluster": "volcano_tts" },
            "speed_ratio": 1,
            "volume_ratio": 1,
            "pitch_ratio": 1,
            "audio": { "rate": 24000 }
        }
    })
}

/// Server configuration
///
/// Contains all configuration needed to run the gateway, including:
/// - Server settings (host, port, TLS, outbound timeout)
/// - ZEGO credentials and API endpoint
/// - Agent registration settings
/// - LLM upstream and relay settings
/// - Conversation history storage
/// - Authentication and security settings (CORS, rate limiting)
#[derive(Debug, Clone)]
pub struct ServerConfig {
    // Server settings
    pub host: String,
    pub port: u16,
    pub tls: Option<TlsConfig>,
    /// Timeout applied to every outbound vendor/LLM request
    pub request_timeout_seconds: u64,

    // ZEGO settings
    pub zego_app_id: Option<u32>,
    pub zego_server_secret: Option<String>,
    pub zego_api_base_url: String,
    /// Lifetime of RTC login tokens handed to browsers
    pub zego_token_expire_seconds: i64,

    pub agent: AgentConfig,

    // LLM settings
    pub llm_base_url: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    /// Completion URL registered with the vendor agent. Defaults to the upstream.
    pub llm_agent_url: Option<String>,
    /// Bearer key callers must present on the relay endpoint
    pub llm_relay_api_key: Option<String>,

    // Conversation history
    pub history_path: Option<PathBuf>, // if None, history lives in memory only
    pub history_max_conversations: usize,

    // Authentication configuration
    pub auth_api_secrets: Vec<AuthApiSecret>,
    pub auth_required: bool,

    // Security configuration
    /// CORS allowed origins (comma-separated list or "*" for all)
    /// Default: None (CORS disabled, same-origin only)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP address
    /// Default: 60
    pub rate_limit_requests_per_second: u32,
    /// Maximum burst size for rate limiting
    /// Default: 10
    pub rate_limit_burst_size: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3001,
            tls: None,
            request_timeout_seconds: 30,
            zego_app_id: None,
            zego_server_secret: None,
            zego_api_base_url: DEFAULT_ZEGO_API_BASE_URL.to_string(),
            zego_token_expire_seconds: 3600,
            agent: AgentConfig::default(),
            llm_base_url: DEFAULT_LLM_BASE_URL.to_string(),
            llm_api_key: None,
            llm_model: DEFAULT_LLM_MODEL.to_string(),
            llm_agent_url: None,
            llm_relay_api_key: None,
            history_path: None,
            history_max_conversations: 50,
            auth_api_secrets: Vec::new(),
            auth_required: false,
            cors_allowed_origins: None,
            rate_limit_requests_per_second: 60,
            rate_limit_burst_size: 10,
        }
    }
}

/// Implement Drop to zeroize all secret fields when ServerConfig is dropped.
impl Drop for ServerConfig {
    fn drop(&mut self) {
        use zeroize::Zeroize;

        if let Some(ref mut secret) = self.zego_server_secret {
            secret.zeroize();
        }
        if let Some(ref mut key) = self.llm_api_key {
            key.zeroize();
        }
        if let Some(ref mut key) = self.llm_relay_api_key {
            key.zeroize();
        }
        for secret in &mut self.auth_api_secrets {
            secret.secret.zeroize();
        }
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// After loading and merging, performs validation on the final configuration.
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        // Note: .env file is loaded in main.rs at application startup
        let yaml_config = yaml::YamlConfig::from_file(path)?;

        let config = merge::merge_config(Some(yaml_config))?;
        validation::validate(&config)?;

        Ok(config)
    }

    /// Get the server address as a string
    ///
    /// Returns the address in the format "host:port"
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// ZEGO app id and server secret, when both are configured
    pub fn zego_credentials(&self) -> Option<(u32, &str)> {
        match (self.zego_app_id, self.zego_server_secret.as_deref()) {
            (Some(app_id), Some(secret)) if !secret.is_empty() => Some((app_id, secret)),
            _ => None,
        }
    }

    /// Full chat-completions URL of the upstream LLM
    pub fn llm_completions_url(&self) -> String {
        format!("{}/chat/completions", self.llm_base_url.trim_end_matches('/'))
    }

    /// Completion URL handed to the vendor agent at registration time
    pub fn llm_agent_url(&self) -> String {
        self.llm_agent_url
            .clone()
            .unwrap_or_else(|| self.llm_completions_url())
    }
}

pub(crate) fn parse_auth_api_secrets_json(
    json_str: &str,
) -> Result<Vec<AuthApiSecret>, Box<dyn std::error::Error>> {
    #[derive(serde::Deserialize)]
    struct AuthApiSecretJson {
        id: String,
        secret: String,
    }

    let secrets: Vec<AuthApiSecretJson> = serde_json::from_str(json_str)
        .map_err(|e| format!("Invalid AUTH_API_SECRETS_JSON format: {e}"))?;

    Ok(secrets
        .into_iter()
        .map(|entry| AuthApiSecret {
            id: entry.id,
            secret: entry.secret,
        })
        .collect())
}
