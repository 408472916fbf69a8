//! Sliding-window rate limiting middleware for the public API surface.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use serde_json::json;

use crate::api::middleware::identity;
use crate::domain::entities::ApiKeyIdentity;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;

/// Checks the caller's sliding window before the handler runs.
///
/// The identifier is the client IP (proxy-aware). Authenticated callers,
/// whether by account header or API key, get the privileged tier. API keys
/// issued with `bypass_rate_limit` skip the shared limiter entirely; their
/// own hourly quota is enforced at authentication.
///
/// Successful responses carry `X-RateLimit-Limit`, `X-RateLimit-Remaining`,
/// and `X-RateLimit-Reset` (unix seconds). A denied request gets `429` with
/// the same figures in the error details.
pub async fn layer(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let key_identity = req.extensions().get::<ApiKeyIdentity>();
    if key_identity.is_some_and(|identity| identity.bypass_rate_limit) {
        return Ok(next.run(req).await);
    }

    let is_privileged = key_identity.is_some() || identity::account_id(req.headers()).is_some();
    let ip = client_ip(req.headers(), &addr);

    let decision = state.rate_limiter.check_and_consume(&ip, is_privileged).await?;
    if !decision.allowed {
        return Err(AppError::rate_limited(
            "Rate limit exceeded",
            json!({
                "limit": decision.limit,
                "reset_at": decision.reset_at,
            }),
        ));
    }

    let mut response = next.run(req).await;
    let headers = response.headers_mut();
    if let Ok(value) = HeaderValue::from_str(&decision.limit.to_string()) {
        headers.insert("x-ratelimit-limit", value);
    }
    if let Ok(value) = HeaderValue::from_str(&decision.remaining.to_string()) {
        headers.insert("x-ratelimit-remaining", value);
    }
    if let Ok(value) = HeaderValue::from_str(&decision.reset_at.timestamp().to_string()) {
        headers.insert("x-ratelimit-reset", value);
    }
    Ok(response)
}
