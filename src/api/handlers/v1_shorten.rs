//! Programmatic shortening for API key holders.

use axum::{Extension, Json, extract::State, http::StatusCode};
use validator::Validate;

use crate::api::dto::shorten::{ScanSummary, ShortenRequest, ShortenResponse};
use crate::api::handlers::shorten::short_url;
use crate::application::services::CreateLinkInput;
use crate::domain::entities::ApiKeyIdentity;
use crate::error::AppError;
use crate::state::AppState;

/// Shortens a URL on behalf of an API key.
///
/// # Endpoint
///
/// `POST /api/v1/shorten` (Bearer key, authenticated by the key middleware)
///
/// The key's account owns the link. Keys issued with `bypass_security` skip
/// the scanner chain, so their responses carry no scan summary.
pub async fn v1_shorten_handler(
    State(state): State<AppState>,
    Extension(identity): Extension<ApiKeyIdentity>,
    Json(payload): Json<ShortenRequest>,
) -> Result<(StatusCode, Json<ShortenResponse>), AppError> {
    payload.validate()?;

    let created = state
        .shortener
        .create(
            Some(&identity.account_id),
            CreateLinkInput {
                url: payload.url,
                password: payload.password,
                expires_at: payload.expires_at,
                rotation_type: None,
                destinations: Vec::new(),
                bypass_security: identity.bypass_security,
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
