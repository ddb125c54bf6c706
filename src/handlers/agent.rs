use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, warn};

use super::required;
use crate::auth::Auth;
use crate::errors::app_error::AppResult;
use crate::state::AppState;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StartRequest {
    pub room_id: String,
    pub user_id: String,
    pub user_stream_id: String,
    /// History conversation to tag with the new agent instance
    pub conversation_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StartResponse {
    pub success: bool,
    pub agent_instance_id: String,
    pub agent_user_id: String,
    pub agent_stream_id: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SendMessageRequest {
    pub agent_instance_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct StopRequest {
    pub agent_instance_id: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    pub fn ok() -> Json<Self> {
        Json(Self { success: true })
    }
}

/// Create an agent instance for a room
///
/// Registers the agent first if this process has not done so yet.
pub async fn start_agent(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Auth>,
    payload: Result<Json<StartRequest>, JsonRejection>,
) -> AppResult<Json<StartResponse>> {
    let Json(request) = payload?;
    let room_id = required(&request.room_id, "roomId")?;
    let user_id = required(&request.user_id, "userId")?;
    let user_stream_id = required(&request.user_stream_id, "userStreamId")?;

    let session = state
        .agent()?
        .create_instance(room_id, user_id, user_stream_id)
        .await?;
    info!(
        room_id = %room_id,
        user_id = %user_id,
        auth_id = ?auth.id,
        agent_instance_id = %session.agent_instance_id,
        "Agent started"
    );

    if let Some(conversation_id) = request.conversation_id.as_deref().filter(|id| !id.is_empty()) {
        // The session is live at this point; a stale conversation id is not fatal
        if let Err(e) = state
            .history
            .attach_agent_instance(conversation_id, &session.agent_instance_id)
            .await
        {
            warn!(conversation_id = %conversation_id, error = %e, "Could not tag conversation with agent instance");
        }
    }

    Ok(Json(StartResponse {
        success: true,
        agent_instance_id: session.agent_instance_id,
        agent_user_id: session.agent_user_id,
        agent_stream_id: session.agent_stream_id,
    }))
}

/// Push a text message into a running agent instance
pub async fn send_message(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SendMessageRequest>, JsonRejection>,
) -> AppResult<Json<SuccessResponse>> {
    let Json(request) = payload?;
    let agent_instance_id = required(&request.agent_instance_id, "agentInstanceId")?;
    let message = required(&request.message, "message")?;

    state
        .agent()?
        .send_message(agent_instance_id, message)
        .await?;
    Ok(SuccessResponse::ok())
}

/// Delete an agent instance
pub async fn stop_agent(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Auth>,
    payload: Result<Json<StopRequest>, JsonRejection>,
) -> AppResult<Json<SuccessResponse>> {
    let Json(request) = payload?;
    let agent_instance_id = required(&request.agent_instance_id, "agentInstanceId")?;

    state.agent()?.delete_instance(agent_instance_id).await?;
    info!(agent_instance_id = %agent_instance_id, auth_id = ?auth.id, "Agent stopped");
    Ok(SuccessResponse::ok())
}
