use axum::{extract::State, response::Json};
use serde::Serialize;
use std::sync::Arc;

use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: &'static str,
    /// Server time, RFC 3339
    pub timestamp: String,
    pub uptime_seconds: u64,
    pub zego_configured: bool,
    pub agent_registered: bool,
    pub history_backend: &'static str,
}

/// Liveness check; never touches the vendor API
pub async fn health_check(State(state): State<Arc<AppState>>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        timestamp: chrono::Utc::now().to_rfc3339(),
        uptime_seconds: state.started_at.elapsed().as_secs(),
        zego_configured: state.agent.is_some(),
        agent_registered: state
            .agent
            .as_ref()
            .is_some_and(|agent| agent.is_registered()),
        history_backend: state.history.backend_name(),
    })
}
