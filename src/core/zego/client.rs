//! Signed HTTP client for the ZEGO agent API

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};
use zeroize::Zeroizing;

use super::messages::ZegoEnvelope;
use super::signature::{generate_nonce, signed_query};
use super::{ZegoError, ZegoResult};
use crate::config::ServerConfig;

/// Client that signs every request and unwraps the vendor envelope
pub struct ZegoClient {
    http: reqwest::Client,
    base_url: String,
    app_id: u32,
    server_secret: Zeroizing<String>,
}

impl ZegoClient {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        app_id: u32,
        server_secret: impl Into<String>,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            app_id,
            server_secret: Zeroizing::new(server_secret.into()),
        }
    }

    /// Build a client from configuration, or `None` when credentials are missing
    pub fn from_config(config: &ServerConfig) -> Option<Self> {
        let (app_id, secret) = config.zego_credentials()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_seconds))
            .build()
            .ok()?;
        Some(Self::new(http, &config.zego_api_base_url, app_id, secret))
    }

    pub fn app_id(&self) -> u32 {
        self.app_id
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Signed URL for `action`, valid for the current second
    pub fn signed_url(&self, action: &str) -> ZegoResult<String> {
        let nonce = generate_nonce();
        let timestamp = chrono::Utc::now().timestamp();
        let query = signed_query(action, self.app_id, &self.server_secret, &nonce, timestamp)?;
        Ok(format!("{}/?{}", self.base_url, query))
    }

    /// POST `body` as `action` and return the envelope's `Data`
    ///
    /// Returns `Value::Null` when the vendor sends no data.
    pub async fn call<B: Serialize + ?Sized>(
        &self,
        action: &str,
        body: &B,
    ) -> ZegoResult<serde_json::Value> {
        let url = self.signed_url(action)?;
        debug!(action = %action, base_url = %self.base_url, "Calling ZEGO API");

        let response = self.http.post(&url).json(body).send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(action = %action, status = %status, "ZEGO API returned HTTP error");
            return Err(ZegoError::Http {
                status: status.as_u16(),
                body: text,
            });
        }

        let envelope: ZegoEnvelope = serde_json::from_str(&text)
            .map_err(|e| ZegoError::InvalidResponse(format!("{e}: {text}")))?;

        if envelope.code != 0 {
            warn!(
                action = %action,
                code = envelope.code,
                message = %envelope.message,
                request_id = ?envelope.request_id,
                "ZEGO API returned error code"
            );
            return Err(ZegoError::Api {
                code: envelope.code,
                message: envelope.message,
                request_id: envelope.request_id,
            });
        }

        debug!(action = %action, request_id = ?envelope.request_id, "ZEGO API call succeeded");
        Ok(envelope.data.unwrap_or(serde_json::Value::Null))
    }
}
