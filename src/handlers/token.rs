use axum::{
    Extension, Json,
    extract::{Query, State, rejection::QueryRejection},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use super::required;
use crate::auth::Auth;
use crate::core::zego::generate_token04;
use crate::errors::app_error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TokenQuery {
    pub user_id: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenResponse {
    pub token: String,
    pub app_id: u32,
    pub user_id: String,
    /// Unix seconds
    pub expire_at: i64,
}

/// Issue an RTC login token so the browser can join a room
pub async fn generate_token(
    State(state): State<Arc<AppState>>,
    Extension(auth): Extension<Auth>,
    query: Result<Query<TokenQuery>, QueryRejection>,
) -> AppResult<Json<TokenResponse>> {
    let Query(query) = query?;
    let user_id = required(&query.user_id, "userId")?;
    let (app_id, secret) = state
        .config
        .zego_credentials()
        .ok_or_else(AppError::zego_not_configured)?;

    let issued = generate_token04(
        app_id,
        user_id,
        secret,
        state.config.zego_token_expire_seconds,
        "",
    )?;

    debug!(user_id = %user_id, auth_id = ?auth.id, expire_at = issued.expire_at, "Issued RTC token");
    Ok(Json(TokenResponse {
        token: issued.token,
        app_id,
        user_id: user_id.to_string(),
        expire_at: issued.expire_at,
    }))
}
