use std::path::PathBuf;

use super::env::config_from_env;
use super::yaml::YamlConfig;
use super::{AuthApiSecret, ServerConfig, TlsConfig};

/// Merge environment configuration with optional YAML overrides
///
/// Environment variables (and defaults) form the base; every value present in the
/// YAML file replaces the corresponding base value.
pub(super) fn merge_config(
    yaml: Option<YamlConfig>,
) -> Result<ServerConfig, Box<dyn std::error::Error>> {
    let mut config = config_from_env()?;

    let Some(yaml) = yaml else {
        return Ok(config);
    };

    if let Some(server) = yaml.server {
        if let Some(host) = server.host {
            config.host = host;
        }
        if let Some(port) = server.port {
            config.port = port;
        }
        if let Some(timeout) = server.request_timeout_seconds {
            config.request_timeout_seconds = timeout;
        }
        if let Some(tls) = server.tls {
            if tls.enabled.unwrap_or(false) {
                let cert_path = tls
                    .cert_path
                    .ok_or("server.tls.enabled is true but cert_path is missing")?;
                let key_path = tls
                    .key_path
                    .ok_or("server.tls.enabled is true but key_path is missing")?;
                config.tls = Some(TlsConfig {
                    cert_path: PathBuf::from(cert_path),
                    key_path: PathBuf::from(key_path),
                });
            } else if tls.enabled == Some(false) {
                config.tls = None;
            }
        }
    }

    if let Some(zego) = yaml.zego {
        if zego.app_id.is_some() {
            config.zego_app_id = zego.app_id;
        }
        if zego.server_secret.is_some() {
            config.zego_server_secret = zego.server_secret;
        }
        if let Some(base_url) = zego.api_base_url {
            config.zego_api_base_url = base_url;
        }
        if let Some(expire) = zego.token_expire_seconds {
            config.zego_token_expire_seconds = expire;
        }
    }

    if let Some(agent) = yaml.agent {
        if let Some(id) = agent.id {
            config.agent.id = id;
        }
        if let Some(name) = agent.name {
            config.agent.name = name;
        }
        if let Some(prompt) = agent.system_prompt {
            config.agent.system_prompt = prompt;
        }
        if let Some(temperature) = agent.temperature {
            config.agent.temperature = temperature;
        }
        if let Some(top_p) = agent.top_p {
            config.agent.top_p = top_p;
        }
        if let Some(tts) = agent.tts {
            config.agent.tts = tts;
        }
        if agent.asr.is_some() {
            config.agent.asr = agent.asr;
        }
    }

    if let Some(llm) = yaml.llm {
        if let Some(base_url) = llm.base_url {
            config.llm_base_url = base_url;
        }
        if llm.api_key.is_some() {
            config.llm_api_key = llm.api_key;
        }
        if let Some(model) = llm.model {
            config.llm_model = model;
        }
        if llm.agent_url.is_some() {
            config.llm_agent_url = llm.agent_url;
        }
        if llm.relay_api_key.is_some() {
            config.llm_relay_api_key = llm.relay_api_key;
        }
    }

    if let Some(history) = yaml.history {
        if let Some(path) = history.path {
            config.history_path = Some(PathBuf::from(path));
        }
        if let Some(max) = history.max_conversations {
            config.history_max_conversations = max;
        }
    }

    if let Some(auth) = yaml.auth {
        if let Some(required) = auth.required {
            config.auth_required = required;
        }
        if !auth.api_secrets.is_empty() {
            config.auth_api_secrets = auth
                .api_secrets
                .into_iter()
                .map(|entry| AuthApiSecret {
                    id: entry.id,
                    secret: entry.secret,
                })
                .collect();
        } else if let Some(secret) = auth.api_secret {
            config.auth_api_secrets = vec![AuthApiSecret {
                id: "default".to_string(),
                secret,
            }];
        }
    }

    if let Some(security) = yaml.security {
        if security.cors_allowed_origins.is_some() {
            config.cors_allowed_origins = security.cors_allowed_origins;
        }
        if let Some(rps) = security.rate_limit_requests_per_second {
            config.rate_limit_requests_per_second = rps;
        }
        if let Some(burst) = security.rate_limit_burst_size {
            config.rate_limit_burst_size = burst;
        }
    }

    Ok(config)
}
