use std::time::Duration;

use bytes::Bytes;
use futures::StreamExt;
use futures::stream::BoxStream;
use serde_json::Value;
use tracing::{debug, info, warn};
use zeroize::Zeroizing;

use super::sse::SseDecoder;
use super::{LlmError, LlmResult};
use crate::config::ServerConfig;

/// What the upstream answered with
pub enum RelayResponse {
    /// Server-sent events, forwarded chunk by chunk
    Stream(BoxStream<'static, Result<Bytes, reqwest::Error>>),
    /// Buffered JSON completion
    Json(Value),
}

impl std::fmt::Debug for RelayResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayResponse::Stream(_) => f.write_str("RelayResponse::Stream"),
            RelayResponse::Json(value) => f.debug_tuple("RelayResponse::Json").field(value).finish(),
        }
    }
}

/// Forwards chat-completions requests to an OpenAI-compatible upstream
pub struct LlmRelay {
    http: reqwest::Client,
    completions_url: String,
    api_key: Option<Zeroizing<String>>,
    default_model: String,
    /// Whole-request limit for buffered completions; streams are bounded by connect time only
    timeout: Option<Duration>,
}

impl LlmRelay {
    pub fn new(
        http: reqwest::Client,
        completions_url: impl Into<String>,
        api_key: Option<String>,
        default_model: impl Into<String>,
    ) -> Self {
        Self {
            http,
            completions_url: completions_url.into(),
            api_key: api_key.filter(|k| !k.is_empty()).map(Zeroizing::new),
            default_model: default_model.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn from_config(config: &ServerConfig) -> LlmResult<Self> {
        let timeout = Duration::from_secs(config.request_timeout_seconds);
        let http = reqwest::Client::builder().connect_timeout(timeout).build()?;
        Ok(Self::new(
            http,
            config.llm_completions_url(),
            config.llm_api_key.clone(),
            config.llm_model.clone(),
        )
        .with_timeout(timeout))
    }

    pub fn completions_url(&self) -> &str {
        &self.completions_url
    }

    /// Forward one chat-completions body upstream
    ///
    /// The body must be a JSON object with a non-empty `messages` array. A
    /// missing or empty `model` is filled with the configured default.
    pub async fn forward(&self, mut body: Value) -> LlmResult<RelayResponse> {
        let object = body
            .as_object_mut()
            .ok_or_else(|| LlmError::InvalidRequest("body must be a JSON object".to_string()))?;

        match object.get("messages") {
            Some(Value::Array(messages)) if !messages.is_empty() => {}
            _ => {
                return Err(LlmError::InvalidRequest(
                    "messages must be a non-empty array".to_string(),
                ));
            }
        }

        let has_model = object
            .get("model")
            .and_then(Value::as_str)
            .is_some_and(|m| !m.is_empty());
        if !has_model {
            object.insert("model".to_string(), Value::String(self.default_model.clone()));
        }

        let streaming = object
            .get("stream")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let model = object
            .get("model")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();

        debug!(model = %model, streaming, url = %self.completions_url, "Relaying completion request");

        let mut request = self.http.post(&self.completions_url).json(&body);
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key.as_str());
        }
        if let (false, Some(timeout)) = (streaming, self.timeout) {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            warn!(model = %model, status = %status, "LLM upstream returned error");
            return Err(LlmError::Upstream {
                status: status.as_u16(),
                body: text,
            });
        }

        if streaming {
            let mut decoder = SseDecoder::new();
            let mut logged = false;
            let stream = response
                .bytes_stream()
                .map(move |chunk| {
                    if let Ok(bytes) = &chunk {
                        decoder.push(bytes);
                        if decoder.is_done() && !logged {
                            logged = true;
                            info!(
                                model = %model,
                                events = decoder.event_count(),
                                chars = decoder.content().chars().count(),
                                "LLM stream relayed"
                            );
                        }
                    }
                    chunk
                })
                .boxed();
            return Ok(RelayResponse::Stream(stream));
        }

        let json: Value = response.json().await?;
        info!(model = %model, "LLM completion relayed");
        Ok(RelayResponse::Json(json))
    }
}
