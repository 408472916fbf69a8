//! API key self-service management.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::keys::{CreateKeyRequest, CreateKeyResponse, KeyListResponse};
use crate::api::middleware::identity;
use crate::error::AppError;
use crate::state::AppState;

/// Issues a new API key for the authenticated account.
///
/// # Endpoint
///
/// `POST /api/keys`
///
/// The raw key appears in this response and nowhere else; only its hash is
/// stored. Bypass grants are admin-only.
pub async fn create_key_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateKeyRequest>,
) -> Result<(StatusCode, Json<CreateKeyResponse>), AppError> {
    payload.validate()?;
    let account = identity::require_account(&headers)?;

    if (payload.bypass_security || payload.bypass_rate_limit) && !state.config.is_admin(&account) {
        return Err(AppError::forbidden(
            "Bypass flags require admin privileges",
            json!({}),
        ));
    }

    let issued = state
        .api_keys
        .issue(
            &account,
            &payload.name,
            payload.expires_at,
            payload.rate_limit,
            payload.bypass_security,
            payload.bypass_rate_limit,
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateKeyResponse {
            id: issued.key.id,
            name: issued.key.name,
            key: issued.raw_key,
            key_prefix: issued.key.key_prefix,
            expires_at: issued.key.expires_at,
            rate_limit: issued.key.rate_limit,
        }),
    ))
}

/// Lists the account's keys (prefixes only, never raw material).
///
/// # Endpoint
///
/// `GET /api/keys`
pub async fn list_keys_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<KeyListResponse>, AppError> {
    let account = identity::require_account(&headers)?;
    let keys = state.api_keys.list_for_account(&account).await?;
    Ok(Json(KeyListResponse { keys }))
}

/// Revokes one of the account's keys.
///
/// # Endpoint
///
/// `DELETE /api/keys/{id}`
pub async fn revoke_key_handler(
    Path(key_id): Path<i64>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let account = identity::require_account(&headers)?;
    state.api_keys.revoke(key_id, &account).await?;
    Ok(StatusCode::NO_CONTENT)
}
