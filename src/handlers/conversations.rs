use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::StatusCode,
};
use serde::Deserialize;
use std::sync::Arc;

use super::agent::SuccessResponse;
use super::required;
use crate::core::history::{ChatMessage, Conversation, ConversationSummary};
use crate::errors::app_error::AppResult;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CreateConversationRequest {
    pub title: Option<String>,
    pub agent_instance_id: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct RenameConversationRequest {
    pub title: String,
}

pub async fn list_conversations(
    State(state): State<Arc<AppState>>,
) -> Json<Vec<ConversationSummary>> {
    Json(state.history.list().await)
}

pub async fn create_conversation(
    State(state): State<Arc<AppState>>,
    body: Result<Option<Json<CreateConversationRequest>>, JsonRejection>,
) -> AppResult<(StatusCode, Json<Conversation>)> {
    let request = body?.map(|Json(r)| r).unwrap_or_default();
    let title = request.title.filter(|t| !t.trim().is_empty());
    let agent_instance_id = request.agent_instance_id.filter(|id| !id.is_empty());

    let conversation = state.history.create(title, agent_instance_id).await?;
    Ok((StatusCode::CREATED, Json(conversation)))
}

pub async fn get_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<Conversation>> {
    Ok(Json(state.history.get(&id).await?))
}

pub async fn rename_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<RenameConversationRequest>, JsonRejection>,
) -> AppResult<Json<Conversation>> {
    let Json(request) = payload?;
    let title = required(&request.title, "title")?;
    Ok(Json(state.history.rename(&id, title).await?))
}

pub async fn delete_conversation(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> AppResult<Json<SuccessResponse>> {
    state.history.delete(&id).await?;
    Ok(SuccessResponse::ok())
}

/// Append a message, or replace it when its id is already present
pub async fn upsert_message(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<ChatMessage>, JsonRejection>,
) -> AppResult<Json<Conversation>> {
    let Json(message) = payload?;
    Ok(Json(state.history.upsert_message(&id, message).await?))
}
