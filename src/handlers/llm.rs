use axum::{
    Json,
    body::Body,
    extract::State,
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde_json::Value;
use std::sync::Arc;

use crate::core::llm::RelayResponse;
use crate::errors::app_error::AppResult;
use crate::state::AppState;

/// OpenAI-compatible chat completions, relayed to the configured upstream
///
/// Streaming requests are answered with the upstream event stream as-is.
pub async fn chat_completions(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> AppResult<Response> {
    match state.relay.forward(body).await? {
        RelayResponse::Stream(stream) => {
            let mut response = Body::from_stream(stream).into_response();
            let headers = response.headers_mut();
            headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/event-stream"),
            );
            headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-cache"));
            headers.insert(header::CONNECTION, HeaderValue::from_static("keep-alive"));
            Ok(response)
        }
        RelayResponse::Json(value) => Ok(Json(value).into_response()),
    }
}
