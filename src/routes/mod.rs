pub mod api;
pub mod relay;

use axum::{Router, middleware, routing::get};
use std::sync::Arc;

use crate::handlers::api::health_check;
use crate::middleware::{auth_middleware, relay_auth_middleware};
use crate::state::AppState;

/// All routes with their authentication layers, state applied
///
/// Transport concerns (CORS, rate limiting, security headers) are added on
/// top of this in `main.rs`.
pub fn create_app_router(app_state: Arc<AppState>) -> Router {
    let protected_routes = api::create_api_router().layer(middleware::from_fn_with_state(
        app_state.clone(),
        auth_middleware,
    ));

    // The relay is called by the vendor agent and checks its own key
    let relay_routes = relay::create_relay_router().layer(middleware::from_fn_with_state(
        app_state.clone(),
        relay_auth_middleware,
    ));

    let public_routes = Router::new().route("/health", get(health_check));

    public_routes
        .merge(protected_routes)
        .merge(relay_routes)
        .with_state(app_state)
}
