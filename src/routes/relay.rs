use axum::{Router, routing::post};
use tower_http::trace::TraceLayer;

use crate::handlers::llm;
use crate::state::AppState;
use std::sync::Arc;

/// OpenAI-compatible completion endpoint the vendor agent calls back into
pub fn create_relay_router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/chat/completions", post(llm::chat_completions))
        .layer(TraceLayer::new_for_http())
}
