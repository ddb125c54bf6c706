use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::{error, warn};

use crate::core::history::HistoryError;
use crate::core::llm::LlmError;
use crate::core::zego::{TokenError, ZegoError};

/// Message returned when an endpoint needs ZEGO credentials that are not set
pub const ZEGO_NOT_CONFIGURED: &str = "ZEGO credentials not configured";

/// Errors surfaced by HTTP handlers
///
/// Every variant renders as a JSON body `{"error": "..."}`. Vendor API
/// failures additionally carry the vendor `code`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    /// A required integration is missing from configuration
    #[error("{0}")]
    NotConfigured(String),

    #[error(transparent)]
    Zego(#[from] ZegoError),

    #[error(transparent)]
    Token(#[from] TokenError),

    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error(transparent)]
    History(#[from] HistoryError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        AppError::BadRequest(message.into())
    }

    pub fn zego_not_configured() -> Self {
        AppError::NotConfigured(ZEGO_NOT_CONFIGURED.to_string())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotConfigured(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Zego(ZegoError::Api { .. }) => StatusCode::BAD_REQUEST,
            AppError::Zego(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Token(TokenError::EmptyUserId) => StatusCode::BAD_REQUEST,
            AppError::Token(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::Llm(LlmError::InvalidRequest(_)) => StatusCode::BAD_REQUEST,
            AppError::Llm(LlmError::Upstream { status, .. }) => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            AppError::Llm(LlmError::Request(_)) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::History(HistoryError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::History(HistoryError::InvalidMessage(_)) => StatusCode::BAD_REQUEST,
            AppError::History(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// Malformed bodies and query strings are validation errors like any other
impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), error = %self, "Request rejected");
        }

        let body = match &self {
            AppError::Zego(ZegoError::Api {
                code,
                message,
                request_id,
            }) => json!({
                "error": message,
                "code": code,
                "requestId": request_id,
            }),
            // Relay errors pass the upstream body through untouched
            AppError::Llm(LlmError::Upstream { body, .. }) => {
                serde_json::from_str(body).unwrap_or_else(|_| json!({ "error": body }))
            }
            other => json!({ "error": other.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}
