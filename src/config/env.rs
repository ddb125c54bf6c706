use std::path::PathBuf;

use super::utils::{env_var, parse_env, parse_env_bool};
use super::{AuthApiSecret, ServerConfig, TlsConfig, merge, parse_auth_api_secrets_json, validation};

impl ServerConfig {
    /// Load configuration from environment variables
    ///
    /// Reads every setting from the process environment (the `.env` file is loaded
    /// into the environment by `main.rs` beforehand), falls back to defaults, and
    /// validates the result.
    ///
    /// # Example
    /// ```rust,no_run
    /// use agent_gateway::config::ServerConfig;
    ///
    /// # fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = ServerConfig::from_env()?;
    /// println!("Listening on {}", config.address());
    /// # Ok(())
    /// # }
    /// ```
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let config = merge::merge_config(None)?;
        validation::validate(&config)?;
        Ok(config)
    }
}

/// Build a configuration from environment variables and defaults only
pub(super) fn config_from_env() -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = ServerConfig::default();

    // Server
    if let Some(host) = env_var("HOST") {
        config.host = host;
    }
    if let Some(port) = parse_env::<u16>("PORT")? {
        config.port = port;
    }
    if let Some(timeout) = parse_env::<u64>("REQUEST_TIMEOUT_SECONDS")? {
        config.request_timeout_seconds = timeout;
    }
    if parse_env_bool("TLS_ENABLED")?.unwrap_or(false) {
        let cert_path = env_var("TLS_CERT_PATH")
            .ok_or("TLS_ENABLED is set but TLS_CERT_PATH is missing")?;
        let key_path =
            env_var("TLS_KEY_PATH").ok_or("TLS_ENABLED is set but TLS_KEY_PATH is missing")?;
        config.tls = Some(TlsConfig {
            cert_path: PathBuf::from(cert_path),
            key_path: PathBuf::from(key_path),
        });
    }

    // ZEGO
    config.zego_app_id = parse_env::<u32>("ZEGO_APP_ID")?;
    config.zego_server_secret = env_var("ZEGO_SERVER_SECRET");
    if let Some(base_url) = env_var("ZEGO_API_BASE_URL") {
        config.zego_api_base_url = base_url;
    }
    if let Some(expire) = parse_env::<i64>("ZEGO_TOKEN_EXPIRE_SECONDS")? {
        config.zego_token_expire_seconds = expire;
    }

    // Agent
    if let Some(id) = env_var("AGENT_ID") {
        config.agent.id = id;
    }
    if let Some(name) = env_var("AGENT_NAME") {
        config.agent.name = name;
    }
    if let Some(prompt) = env_var("AGENT_SYSTEM_PROMPT") {
        config.agent.system_prompt = prompt;
    }

    // LLM
    if let Some(base_url) = env_var("LLM_BASE_URL") {
        config.llm_base_url = base_url;
    }
    config.llm_api_key = env_var("LLM_API_KEY").or_else(|| env_var("DASHSCOPE_API_KEY"));
    if let Some(model) = env_var("LLM_MODEL") {
        config.llm_model = model;
    }
    config.llm_agent_url = env_var("LLM_AGENT_URL");
    config.llm_relay_api_key = env_var("LLM_RELAY_API_KEY");

    // History
    config.history_path = env_var("HISTORY_PATH").map(PathBuf::from);
    if let Some(max) = parse_env::<usize>("HISTORY_MAX_CONVERSATIONS")? {
        config.history_max_conversations = max;
    }

    // Auth
    config.auth_required = parse_env_bool("AUTH_REQUIRED")?.unwrap_or(false);
    config.auth_api_secrets = if let Some(json) = env_var("AUTH_API_SECRETS_JSON") {
        parse_auth_api_secrets_json(&json)?
    } else if let Some(secret) = env_var("AUTH_API_SECRET") {
        vec![AuthApiSecret {
            id: env_var("AUTH_API_SECRET_ID").unwrap_or_else(|| "default".to_string()),
            secret,
        }]
    } else {
        Vec::new()
    };

    // Security
    config.cors_allowed_origins = env_var("CORS_ALLOWED_ORIGINS");
    if let Some(rps) = parse_env::<u32>("RATE_LIMIT_REQUESTS_PER_SECOND")? {
        config.rate_limit_requests_per_second = rps;
    }
    if let Some(burst) = parse_env::<u32>("RATE_LIMIT_BURST_SIZE")? {
        config.rate_limit_burst_size = burst;
    }

    Ok(config)
}
