//! Shared helpers for router-level tests

#![allow(dead_code)]

use std::sync::Arc;

use agent_gateway::{ServerConfig, routes, state::AppState};
use axum::{
    Router,
    body::Body,
    http::{Request, Response},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use wiremock::ResponseTemplate;

pub const APP_ID: u32 = 1234567890;
pub const SERVER_SECRET: &str = "0123456789abcdef0123456789abcdef";

/// Configuration with no vendor credentials and in-memory history
pub fn minimal_config() -> ServerConfig {
    let mut config = ServerConfig::default();
    config.host = "127.0.0.1".to_string();
    config.request_timeout_seconds = 5;
    config
}

/// Configuration pointing the ZEGO client at `zego_base_url`
pub fn zego_config(zego_base_url: &str) -> ServerConfig {
    let mut config = minimal_config();
    config.zego_app_id = Some(APP_ID);
    config.zego_server_secret = Some(SERVER_SECRET.to_string());
    config.zego_api_base_url = zego_base_url.to_string();
    config
}

pub async fn app(config: ServerConfig) -> (Router, Arc<AppState>) {
    let state = AppState::new(config).await.expect("app state");
    (routes::create_app_router(state.clone()), state)
}

pub fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Successful vendor envelope
pub fn zego_ok(data: Value) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "Code": 0,
        "Message": "success",
        "RequestId": "req-ok",
        "Data": data,
    }))
}

/// Vendor envelope carrying a business error
pub fn zego_err(code: i64, message: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_json(json!({
        "Code": code,
        "Message": message,
        "RequestId": "req-err",
    }))
}
