use crate::auth::{Auth, match_api_secret_id};
use crate::errors::auth_error::AuthError;
use crate::state::AppState;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

/// Extract the bearer token from a request
///
/// Token sources, in order:
/// 1. `Authorization: Bearer <token>`
/// 2. `?token=<token>` query parameter
pub(crate) fn extract_token(request: &Request) -> Result<String, AuthError> {
    if let Some(auth_header) = request.headers().get("authorization") {
        let auth_str = auth_header
            .to_str()
            .map_err(|_| AuthError::InvalidAuthHeader)?;

        if let Some(token) = auth_str.strip_prefix("Bearer ") {
            tracing::debug!("Token extracted from Authorization header");
            return Ok(token.to_string());
        }
        return Err(AuthError::InvalidAuthHeader);
    }

    if let Some(query) = request.uri().query() {
        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            if key == "token" {
                tracing::debug!("Token extracted from query parameter");
                return Ok(value.to_string());
            }
        }
    }

    Err(AuthError::MissingAuthHeader)
}

/// Authentication middleware for the browser-facing API
///
/// When `auth_required` is off every request passes with an empty [`Auth`].
/// Otherwise the bearer token must match one of the configured API secrets;
/// the matching secret's id is inserted into the request extensions.
pub async fn auth_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    if !state.config.auth_required {
        tracing::debug!("Authentication disabled, inserting empty Auth context");
        request.extensions_mut().insert(Auth::empty());
        return Ok(next.run(request).await);
    }

    let request_method = request.method().to_string();
    let request_path = request.uri().path().to_string();

    let token = extract_token(&request)?;

    match match_api_secret_id(&token, &state.config.auth_api_secrets) {
        Some(secret_id) => {
            tracing::debug!(
                method = %request_method,
                path = %request_path,
                auth_id = %secret_id,
                "API secret authentication successful"
            );
            request.extensions_mut().insert(Auth::new(secret_id));
            Ok(next.run(request).await)
        }
        None => {
            tracing::warn!(
                method = %request_method,
                path = %request_path,
                "API secret authentication failed: token mismatch"
            );
            Err(AuthError::Unauthorized("Invalid API secret".to_string()))
        }
    }
}

/// Guard for the LLM relay endpoint
///
/// The relay is called by the vendor agent rather than by browsers, so it
/// checks its own key (`llm_relay_api_key`). Without a key the relay is open.
pub async fn relay_auth_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Result<Response, AuthError> {
    let Some(expected) = state.config.llm_relay_api_key.as_deref() else {
        return Ok(next.run(request).await);
    };

    let token = extract_token(&request)?;
    if crate::auth::secrets_match(&token, expected) {
        Ok(next.run(request).await)
    } else {
        tracing::warn!(path = %request.uri().path(), "Relay authentication failed");
        Err(AuthError::Unauthorized("Invalid relay API key".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request(uri: &str, auth: Option<&str>) -> Request {
        let mut builder = Request::builder().uri(uri);
        if let Some(value) = auth {
            builder = builder.header("authorization", value);
        }
        builder.body(Body::empty()).unwrap()
    }

    #[test]
    fn test_extract_token_from_header() {
        let token = extract_token(&request("/api/start", Some("Bearer abc"))).unwrap();
        assert_eq!(token, "abc");
    }

    #[test]
    fn test_extract_token_from_query() {
        let token = extract_token(&request("/api/token?userId=u&token=q%2Bw", None)).unwrap();
        assert_eq!(token, "q+w");
    }

    #[test]
    fn test_extract_token_errors() {
        assert!(matches!(
            extract_token(&request("/api/start", Some("Basic abc"))),
            Err(AuthError::InvalidAuthHeader)
        ));
        assert!(matches!(
            extract_token(&request("/api/start", None)),
            Err(AuthError::MissingAuthHeader)
        ));
    }
}
