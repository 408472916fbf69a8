//! Password gate verification.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderValue, header},
    response::{IntoResponse, Response},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::links::{VerifyPasswordRequest, VerifyPasswordResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::gate_token::{self, GATE_TOKEN_TTL_SECONDS};
use crate::utils::password::verify_password;

/// Verifies a link password and issues the gate cookie.
///
/// # Endpoint
///
/// `POST /api/urls/{code}/verify-password`
///
/// The stored hash is read from persistence, never the cache; cached link
/// copies deliberately carry no password material. On success the response
/// sets an HttpOnly `gate_<code>` cookie holding a signed token the redirect
/// pipeline accepts for 24 hours.
///
/// # Errors
///
/// - `404` for unknown or unresolvable codes
/// - `400` when the link has no password
/// - `401` for a wrong password
pub async fn verify_password_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    Json(payload): Json<VerifyPasswordRequest>,
) -> Result<Response, AppError> {
    payload.validate()?;

    let link = state
        .shortener
        .find_by_code(&code)
        .await?
        .filter(|link| link.is_resolvable())
        .ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "code": code }))
        })?;

    let Some(stored_hash) = link.password_hash.as_deref() else {
        return Err(AppError::bad_request(
            "Link is not password protected",
            json!({ "code": code }),
        ));
    };

    if !verify_password(&payload.password, stored_hash) {
        return Err(AppError::unauthorized("Invalid password", json!({})));
    }

    let token = gate_token::issue(&code, &state.config.gate_signing_secret);
    let cookie = format!(
        "gate_{}={}; Max-Age={}; Path=/; HttpOnly; SameSite=Lax",
        code, token, GATE_TOKEN_TTL_SECONDS
    );

    let mut response = Json(VerifyPasswordResponse { verified: true }).into_response();
    if let Ok(value) = HeaderValue::from_str(&cookie) {
        response.headers_mut().insert(header::SET_COOKIE, value);
    }
    Ok(response)
}
