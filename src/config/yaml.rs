use serde::Deserialize;
use std::path::PathBuf;

/// Complete YAML configuration structure
///
/// This structure represents the full configuration that can be loaded from a YAML file.
/// All fields are optional to allow partial configuration. Values present in the
/// file take precedence over environment variables.
///
/// # Example YAML structure
/// ```yaml
/// server:
///   host: "0.0.0.0"
///   port: 3001
///   request_timeout_seconds: 30
///
/// zego:
///   app_id: 1234567890
///   server_secret: "0123456789abcdef0123456789abcdef"
///   api_base_url: "https://aigc-aiagent-api.zegotech.cn"
///   token_expire_seconds: 3600
///
/// agent:
///   id: "ai_agent_default"
///   name: "AI Assistant"
///   system_prompt: "You are a helpful voice assistant."
///   tts:
///     Vendor: "ByteDance"
///     Params:
///       voice: { voice_type: "zh_female_wanwanxiaohe_moon_bigtts" }
///
/// llm:
///   base_url: "https://dashscope.aliyuncs.com/compatible-mode/v1"
///   api_key: "sk-..."
///   model: "qwen-plus"
///   relay_api_key: "relay-secret"
///
/// history:
///   path: "/var/lib/agent-gateway/history.json"
///   max_conversations: 50
///
/// auth:
///   required: true
///   api_secrets:
///     - id: "web-client"
///       secret: "your-api-secret"
///
/// security:
///   cors_allowed_origins: "https://chat.example.com"
///   rate_limit_requests_per_second: 60
///   rate_limit_burst_size: 10
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub server: Option<ServerYaml>,
    pub zego: Option<ZegoYaml>,
    pub agent: Option<AgentYaml>,
    pub llm: Option<LlmYaml>,
    pub history: Option<HistoryYaml>,
    pub auth: Option<AuthYaml>,
    pub security: Option<SecurityYaml>,
}

/// Server configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ServerYaml {
    pub host: Option<String>,
    pub port: Option<u16>,
    pub tls: Option<TlsYaml>,
    pub request_timeout_seconds: Option<u64>,
}

/// TLS configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct TlsYaml {
    pub enabled: Option<bool>,
    pub cert_path: Option<String>,
    pub key_path: Option<String>,
}

/// ZEGO platform credentials from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ZegoYaml {
    pub app_id: Option<u32>,
    pub server_secret: Option<String>,
    pub api_base_url: Option<String>,
    pub token_expire_seconds: Option<i64>,
}

/// Agent registration settings from YAML
///
/// `tts` and `asr` are passed to the vendor verbatim, so they keep the
/// vendor's PascalCase keys.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AgentYaml {
    pub id: Option<String>,
    pub name: Option<String>,
    pub system_prompt: Option<String>,
    pub temperature: Option<f32>,
    pub top_p: Option<f32>,
    pub tts: Option<serde_json::Value>,
    pub asr: Option<serde_json::Value>,
}

/// LLM upstream settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LlmYaml {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub model: Option<String>,
    /// URL the vendor agent calls for completions (defaults to the upstream)
    pub agent_url: Option<String>,
    /// Bearer key required on the relay endpoint
    pub relay_api_key: Option<String>,
}

/// Conversation history settings from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct HistoryYaml {
    pub path: Option<String>,
    pub max_conversations: Option<usize>,
}

/// Authentication configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AuthYaml {
    pub required: Option<bool>,
    /// Preferred multi-secret form. If non-empty, it takes precedence over api_secret.
    #[serde(default)]
    pub api_secrets: Vec<AuthApiSecretYaml>,
    /// Legacy single-secret alias. Ignored when api_secrets is non-empty.
    pub api_secret: Option<String>,
}

/// API secret authentication entry in YAML
#[derive(Debug, Clone, Deserialize)]
pub struct AuthApiSecretYaml {
    pub id: String,
    pub secret: String,
}

/// Security configuration from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SecurityYaml {
    /// CORS allowed origins (comma-separated list or "*" for all)
    pub cors_allowed_origins: Option<String>,
    /// Maximum requests per second per IP address
    pub rate_limit_requests_per_second: Option<u32>,
    /// Maximum burst size for rate limiting
    pub rate_limit_burst_size: Option<u32>,
}

impl YamlConfig {
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
server:
  host: "127.0.0.1"
  port: 8080
  request_timeout_seconds: 15

zego:
  app_id: 1234567890
  server_secret: "0123456789abcdef0123456789abcdef"
  api_base_url: "https://aigc-aiagent-api.zegotech.cn"
  token_expire_seconds: 7200

agent:
  id: "agent-1"
  name: "Helper"
  system_prompt: "Be brief."
  temperature: 0.5
  tts:
    Vendor: "ByteDance"
    Params:
      voice:
        voice_type: "zh_female_wanwanxiaohe_moon_bigtts"

llm:
  base_url: "https://api.openai.com/v1"
  api_key: "sk-test"
  model: "gpt-4o-mini"
  relay_api_key: "relay"

history:
  path: "/tmp/history.json"
  max_conversations: 10

auth:
  required: true
  api_secrets:
    - id: "client-a"
      secret: "auth-secret"

security:
  cors_allowed_origins: "*"
  rate_limit_requests_per_second: 5
"#;

        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();

        let server = config.server.unwrap();
        assert_eq!(server.host, Some("127.0.0.1".to_string()));
        assert_eq!(server.port, Some(8080));
        assert_eq!(server.request_timeout_seconds, Some(15));

        let zego = config.zego.unwrap();
        assert_eq!(zego.app_id, Some(1234567890));
        assert_eq!(zego.token_expire_seconds, Some(7200));

        let agent = config.agent.unwrap();
        assert_eq!(agent.id, Some("agent-1".to_string()));
        assert_eq!(agent.temperature, Some(0.5));
        let tts = agent.tts.unwrap();
        assert_eq!(tts["Vendor"], "ByteDance");
        assert!(agent.asr.is_none());

        let llm = config.llm.unwrap();
        assert_eq!(llm.model, Some("gpt-4o-mini".to_string()));
        assert_eq!(llm.relay_api_key, Some("relay".to_string()));

        let history = config.history.unwrap();
        assert_eq!(history.max_conversations, Some(10));

        let auth = config.auth.unwrap();
        assert_eq!(auth.required, Some(true));
        assert_eq!(auth.api_secrets.len(), 1);
        assert_eq!(auth.api_secrets[0].id, "client-a");

        let security = config.security.unwrap();
        assert_eq!(security.cors_allowed_origins, Some("*".to_string()));
        assert_eq!(security.rate_limit_requests_per_second, Some(5));
        assert_eq!(security.rate_limit_burst_size, None);
    }

    #[test]
    fn test_yaml_config_auth_legacy_api_secret() {
        let yaml = r#"
auth:
  api_secret: "legacy-secret"
"#;
        let config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        let auth = config.auth.unwrap();
        assert!(auth.api_secrets.is_empty());
        assert_eq!(auth.api_secret, Some("legacy-secret".to_string()));
    }

    #[test]
    fn test_yaml_config_empty() {
        let config: YamlConfig = serde_yaml::from_str("{}").unwrap();
        assert!(config.server.is_none());
        assert!(config.zego.is_none());
        assert!(config.llm.is_none());
    }

    #[test]
    fn test_from_file_not_found() {
        let result = YamlConfig::from_file(&PathBuf::from("/nonexistent/config.yaml"));
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    fn test_from_file_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.yaml");
        fs::write(&path, "zego: [unclosed").unwrap();

        let result = YamlConfig::from_file(&path);
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse YAML")
        );
    }
}
