//! Short-code resolution and redirect pipeline.

use axum::{
    Json,
    extract::{ConnectInfo, Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use metrics::counter;
use serde::Deserialize;
use serde_json::json;
use std::net::SocketAddr;
use tracing::debug;

use crate::api::dto::links::{PasswordGateResponse, PreviewResponse};
use crate::domain::click_event::ClickEvent;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::bot_detector::is_social_bot;
use crate::utils::client_ip::client_ip;
use crate::utils::gate_token;
use crate::utils::hashing::hash_ip;

#[derive(Debug, Deserialize)]
pub struct RedirectQuery {
    /// `?preview=1` forces the preview response for human inspection.
    #[serde(default)]
    pub preview: Option<String>,
}

/// Resolves a short code.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Pipeline
///
/// 1. Social-bot user agent or `?preview=1` → preview metadata, no redirect,
///    no click. A locked password gate withholds the destination.
/// 2. Cache-first resolution with persistence fallback and lazy expiry.
///    Absent, inactive, flagged, and expired codes all 404 identically.
/// 3. Password-protected links without a valid gate cookie get the gate
///    response instead of a redirect.
/// 4. Fire-and-forget click tracking through the bounded channel; a full
///    queue drops the click.
/// 5. Rotation links resolve through the rotation engine.
/// 6. 307 Temporary Redirect.
pub async fn redirect_handler(
    Path(code): Path<String>,
    Query(query): Query<RedirectQuery>,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
) -> Result<Response, AppError> {
    let user_agent = headers
        .get(header::USER_AGENT)
        .and_then(|v| v.to_str().ok());

    let Some(link) = state.shortener.resolve(&code).await? else {
        counter!("redirects_not_found_total").increment(1);
        return Err(AppError::not_found(
            "Short link not found",
            json!({ "code": code }),
        ));
    };

    let preview_requested = query.preview.as_deref() == Some("1");
    if preview_requested || is_social_bot(user_agent) {
        debug!(%code, "serving preview instead of redirect");
        // A locked gate withholds the destination here too; the preview must
        // not reveal what the redirect would not.
        let unlocked =
            !link.is_password_protected || has_valid_gate_cookie(&headers, &code, &state);
        return Ok(Json(PreviewResponse::from_link(&link, unlocked)).into_response());
    }

    if link.is_password_protected && !has_valid_gate_cookie(&headers, &code, &state) {
        return Ok((
            StatusCode::UNAUTHORIZED,
            Json(PasswordGateResponse {
                code: code.clone(),
                password_required: true,
            }),
        )
            .into_response());
    }

    // Click tracking never blocks the redirect; a full queue drops silently.
    let ip = client_ip(&headers, &addr);
    let event = ClickEvent::new(
        code.clone(),
        hash_ip(&ip, &state.config.ip_hash_salt),
        user_agent,
        headers.get(header::REFERER).and_then(|v| v.to_str().ok()),
    );
    let _ = state.click_tx.try_send(event);

    let destination = if link.is_rotation {
        match state.rotation.select_destination(&link).await? {
            Some(picked) => picked.destination,
            None => link.original_url.clone(),
        }
    } else {
        link.original_url.clone()
    };

    counter!("redirects_total").increment(1);
    Ok(Redirect::temporary(&destination).into_response())
}

/// Looks for a `gate_<code>` cookie carrying a valid HMAC token.
fn has_valid_gate_cookie(headers: &HeaderMap, code: &str, state: &AppState) -> bool {
    let Some(cookies) = headers.get(header::COOKIE).and_then(|v| v.to_str().ok()) else {
        return false;
    };

    let wanted = format!("gate_{}=", code);
    cookies
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(wanted.as_str()))
        .is_some_and(|token| gate_token::verify(token, code, &state.config.gate_signing_secret))
}
