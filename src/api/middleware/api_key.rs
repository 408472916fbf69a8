//! Bearer API key authentication for the v1 surface.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, FromRequestParts, Request, State},
    middleware::Next,
    response::Response,
};
use axum_auth::AuthBearer;
use tracing::warn;

use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;
use crate::utils::hashing::hash_ip;

/// Authenticates `Authorization: Bearer sk_live_...` requests.
///
/// On success the resolved [`ApiKeyIdentity`] is inserted as a request
/// extension for the handler, and one usage row is recorded against the key
/// after the response, carrying the endpoint, method, status, and hashed
/// client IP.
///
/// # Errors
///
/// Returns `401 Unauthorized` for a missing header or an unknown, revoked,
/// or expired key, and `429` when the key's hourly window is exhausted.
///
/// [`ApiKeyIdentity`]: crate::domain::entities::ApiKeyIdentity
pub async fn layer(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let (mut parts, body) = req.into_parts();

    let AuthBearer(token) = AuthBearer::from_request_parts(&mut parts, &())
        .await
        .map_err(|_| {
            AppError::unauthorized(
                "Unauthorized",
                serde_json::json!({"reason": "Authorization header is missing or invalid"}),
            )
        })?;

    let identity = state.api_keys.authenticate(&token).await?;
    let key_id = identity.api_key_id;
    let endpoint = parts.uri.path().to_string();
    let method = parts.method.to_string();
    let ip_hash = hash_ip(&client_ip(&parts.headers, &addr), &state.config.ip_hash_salt);

    let mut req = Request::from_parts(parts, body);
    req.extensions_mut().insert(identity);

    let response = next.run(req).await;

    // Usage accounting is best-effort; a failed insert never fails the
    // request it describes.
    if let Err(e) = state
        .api_keys
        .log_usage(
            key_id,
            &endpoint,
            &method,
            i32::from(response.status().as_u16()),
            Some(ip_hash),
        )
        .await
    {
        warn!(key_id, error = %e, "API key usage logging failed");
    }

    Ok(response)
}
