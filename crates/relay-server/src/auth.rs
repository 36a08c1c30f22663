//! Request authentication middleware
//!
//! - `require_api_key`: execution keys via `X-API-Key` or `Authorization: Bearer`
//! - `require_session`: session tokens via `Authorization: Bearer`, resolving
//!   the owning [`Principal`] into request extensions

use axum::{
    extract::{Request, State},
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};

use relay::Principal;

use crate::error::ApiError;
use crate::AppState;

pub const API_KEY_HEADER: &str = "x-api-key";

fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

fn api_key(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok())
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .or_else(|| bearer_token(headers))
}

/// Gate for the execution proxy
pub async fn require_api_key(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    if !state.gate.api_keys_enabled() {
        // No keys configured = auth disabled (for development)
        tracing::warn!("No API keys configured, execution authentication disabled");
        return Ok(next.run(request).await);
    }

    let Some(key) = api_key(request.headers()) else {
        tracing::warn!("Missing API key");
        return Err(ApiError::Unauthorized("API key is required".to_string()));
    };

    match state.gate.authorize_api_key(key) {
        Some(identity) => {
            tracing::debug!(key = %identity.label, "API key accepted");
            Ok(next.run(request).await)
        }
        None => {
            tracing::warn!("Invalid API key attempted");
            Err(ApiError::Unauthorized("Invalid API key".to_string()))
        }
    }
}

/// Gate for owner-scoped management routes
pub async fn require_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(token) = bearer_token(request.headers()) else {
        tracing::warn!("Missing Authorization header");
        return Err(ApiError::Unauthorized(
            "Authorization token is required".to_string(),
        ));
    };

    let principal: Principal = state
        .gate
        .authenticate_session(token)
        .await?
        .ok_or_else(|| {
            tracing::warn!("Invalid or expired session token");
            ApiError::Unauthorized("Invalid or expired token".to_string())
        })?;

    request.extensions_mut().insert(principal);
    Ok(next.run(request).await)
}
