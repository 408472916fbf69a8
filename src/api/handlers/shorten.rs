//! Public shortening endpoint.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::shorten::{ScanSummary, ShortenRequest, ShortenResponse};
use crate::api::middleware::identity;
use crate::application::services::CreateLinkInput;
use crate::domain::repositories::DetachOutcome;
use crate::error::AppError;
use crate::state::AppState;

/// Shortens a URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// Anonymous submissions are accepted but always expire after the configured
/// default window; authenticated accounts keep their requested expiry and
/// become owners of the link. A deduplicated destination answers `200` with
/// `is_new = false`; a fresh link answers `201`.
pub async fn shorten_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;
    let account = identity::account_id(&headers);

    let created = state
        .shortener
        .create(
            account.as_deref(),
            CreateLinkInput {
                url: payload.url,
                password: payload.password,
                expires_at: payload.expires_at,
                rotation_type: None,
                destinations: Vec::new(),
                bypass_security: false,
            },
        )
        .await?;

    let status = if created.is_new {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((
        status,
        Json(ShortenResponse {
            short_url: short_url(&state, &created.link.short_code),
            code: created.link.short_code,
            is_new: created.is_new,
            expires_at: created.link.expires_at,
            scan_summary: created.validation.as_ref().map(ScanSummary::from_validation),
        }),
    ))
}

/// Removes the caller's claim on a link.
///
/// # Endpoint
///
/// `DELETE /api/urls/{code}`
///
/// Shared links survive until the last owner detaches; only then is the row
/// destroyed. Non-owners get the same 404 as an unknown code.
pub async fn detach_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let account = identity::require_account(&headers)?;

    let link = state.shortener.find_by_code(&code).await?.ok_or_else(|| {
        AppError::not_found("Short link not found", json!({ "code": code }))
    })?;

    match state.shortener.detach(&account, &link).await? {
        DetachOutcome::NotOwner => Err(AppError::not_found(
            "Short link not found",
            json!({ "code": code }),
        )),
        DetachOutcome::Remaining(_) | DetachOutcome::Deleted => Ok(StatusCode::NO_CONTENT),
    }
}

/// Joins the configured base URL with a short code.
pub(crate) fn short_url(state: &AppState, code: &str) -> String {
    format!("{}/{}", state.config.base_url.trim_end_matches('/'), code)
}
