use std::collections::HashSet;

use super::{AuthApiSecret, ServerConfig};

/// Run every validation rule against a merged configuration
pub(super) fn validate(config: &ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    validate_zego(config.zego_app_id, config.zego_server_secret.as_deref())?;
    validate_auth_api_secrets(&config.auth_api_secrets)?;
    validate_auth_required(config.auth_required, &config.auth_api_secrets)?;

    if config.zego_token_expire_seconds <= 0 {
        return Err("ZEGO token lifetime must be positive".into());
    }
    if config.history_max_conversations == 0 {
        return Err("history.max_conversations must be at least 1".into());
    }
    if config.rate_limit_requests_per_second == 0 || config.rate_limit_burst_size == 0 {
        return Err("Rate limit values must be at least 1".into());
    }
    if config.request_timeout_seconds == 0 {
        return Err("request_timeout_seconds must be at least 1".into());
    }

    Ok(())
}

/// Validate ZEGO credentials
///
/// The server secret doubles as the AES key for RTC tokens, so its length
/// must be a valid AES key size.
pub(super) fn validate_zego(
    app_id: Option<u32>,
    server_secret: Option<&str>,
) -> Result<(), Box<dyn std::error::Error>> {
    if app_id == Some(0) {
        return Err("ZEGO_APP_ID must be non-zero".into());
    }

    if let Some(secret) = server_secret {
        if !matches!(secret.len(), 16 | 24 | 32) {
            return Err(format!(
                "ZEGO_SERVER_SECRET must be 16, 24 or 32 bytes long, got {}",
                secret.len()
            )
            .into());
        }
    }

    Ok(())
}

/// Validate API secret entries: ids unique and non-empty, secrets non-empty
pub(super) fn validate_auth_api_secrets(
    secrets: &[AuthApiSecret],
) -> Result<(), Box<dyn std::error::Error>> {
    let mut seen = HashSet::new();
    for entry in secrets {
        if entry.id.trim().is_empty() {
            return Err("API secret id must not be empty".into());
        }
        if entry.secret.is_empty() {
            return Err(format!("API secret for id '{}' must not be empty", entry.id).into());
        }
        if !seen.insert(entry.id.as_str()) {
            return Err(format!("Duplicate API secret id '{}'", entry.id).into());
        }
    }
    Ok(())
}

/// Authentication can only be required when there is something to check against
pub(super) fn validate_auth_required(
    auth_required: bool,
    secrets: &[AuthApiSecret],
) -> Result<(), Box<dyn std::error::Error>> {
    if auth_required && secrets.is_empty() {
        return Err(
            "AUTH_REQUIRED is true but no API secrets are configured \
             (set AUTH_API_SECRETS_JSON or AUTH_API_SECRET)"
                .into(),
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secret(id: &str, secret: &str) -> AuthApiSecret {
        AuthApiSecret {
            id: id.to_string(),
            secret: secret.to_string(),
        }
    }

    #[test]
    fn test_validate_zego() {
        assert!(validate_zego(None, None).is_ok());
        assert!(validate_zego(Some(1), Some("0123456789abcdef")).is_ok());
        assert!(validate_zego(Some(1), Some("0123456789abcdef01234567")).is_ok());
        assert!(validate_zego(Some(1), Some("0123456789abcdef0123456789abcdef")).is_ok());
        assert!(validate_zego(Some(0), None).is_err());
        assert!(validate_zego(Some(1), Some("short")).is_err());
    }

    #[test]
    fn test_validate_auth_api_secrets() {
        assert!(validate_auth_api_secrets(&[]).is_ok());
        assert!(validate_auth_api_secrets(&[secret("a", "x"), secret("b", "y")]).is_ok());

        let err = validate_auth_api_secrets(&[secret("a", "x"), secret("a", "y")]).unwrap_err();
        assert!(err.to_string().contains("Duplicate"));

        assert!(validate_auth_api_secrets(&[secret(" ", "x")]).is_err());
        assert!(validate_auth_api_secrets(&[secret("a", "")]).is_err());
    }

    #[test]
    fn test_validate_auth_required() {
        assert!(validate_auth_required(false, &[]).is_ok());
        assert!(validate_auth_required(true, &[]).is_err());
        assert!(validate_auth_required(true, &[secret("a", "x")]).is_ok());
    }

    #[test]
    fn test_validate_full_config() {
        let mut config = ServerConfig::default();
        assert!(validate(&config).is_ok());

        config.history_max_conversations = 0;
        assert!(validate(&config).is_err());

        config.history_max_conversations = 10;
        config.zego_token_expire_seconds = 0;
        assert!(validate(&config).is_err());

        config.zego_token_expire_seconds = 60;
        config.rate_limit_burst_size = 0;
        assert!(validate(&config).is_err());
    }
}
