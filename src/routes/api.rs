use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::trace::TraceLayer;

use crate::handlers::{agent, conversations, token};
use crate::state::AppState;
use std::sync::Arc;

/// Create the API router with protected routes
///
/// Note: Authentication middleware is applied by the caller once state is available
pub fn create_api_router() -> Router<Arc<AppState>> {
    Router::new()
        // Agent lifecycle
        .route("/api/start", post(agent::start_agent))
        .route("/api/send-message", post(agent::send_message))
        .route("/api/stop", post(agent::stop_agent))
        // RTC login token
        .route("/api/token", get(token::generate_token))
        // Conversation history
        .route(
            "/api/conversations",
            get(conversations::list_conversations).post(conversations::create_conversation),
        )
        .route(
            "/api/conversations/{id}",
            get(conversations::get_conversation)
                .patch(conversations::rename_conversation)
                .delete(conversations::delete_conversation),
        )
        .route(
            "/api/conversations/{id}/messages",
            put(conversations::upsert_message),
        )
        .layer(TraceLayer::new_for_http())
}
