//! Rotation link management.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::rotation::{
    CreateRotationRequest, CreateRotationResponse, RotationStatsResponse,
    UpdateDestinationRequest,
};
use crate::api::handlers::shorten::short_url;
use crate::api::middleware::identity;
use crate::application::services::CreateLinkInput;
use crate::domain::entities::{NewRotationDestination, RotationDestination, RotationDestinationPatch};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a rotation link.
///
/// # Endpoint
///
/// `POST /api/rotation`
///
/// Rotation links never deduplicate onto existing codes. Every destination
/// passes normalization; the primary URL passes the scanner chain.
pub async fn create_rotation_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<CreateRotationRequest>,
) -> Result<(StatusCode, Json<CreateRotationResponse>), AppError> {
    payload.validate()?;
    let account = identity::account_id(&headers);

    let destinations: Vec<NewRotationDestination> = payload
        .destinations
        .into_iter()
        .map(|item| NewRotationDestination {
            destination: item.url,
            weight: item.weight,
            label: item.label,
        })
        .collect();
    let destination_count = destinations.len();

    let created = state
        .shortener
        .create(
            account.as_deref(),
            CreateLinkInput {
                url: payload.url,
                password: None,
                expires_at: None,
                rotation_type: Some(payload.rotation_type),
                destinations,
                bypass_security: false,
            },
        )
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(CreateRotationResponse {
            short_url: short_url(&state, &created.link.short_code),
            code: created.link.short_code,
            rotation_type: payload.rotation_type,
            destinations: destination_count,
        }),
    ))
}

/// Returns the per-destination click breakdown for a rotation link.
///
/// # Endpoint
///
/// `GET /api/rotation/{code}` (owner or admin)
pub async fn rotation_stats_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<RotationStatsResponse>, AppError> {
    let account = identity::require_account(&headers)?;

    let link = state.shortener.find_by_code(&code).await?.ok_or_else(|| {
        AppError::not_found("Short link not found", json!({ "code": code }))
    })?;
    if !link.is_rotation {
        return Err(AppError::bad_request(
            "Link is not a rotation link",
            json!({ "code": code }),
        ));
    }

    require_link_access(&state, &account, link.id).await?;

    let destinations = state.rotation.list_all(link.id).await?;
    Ok(Json(RotationStatsResponse {
        code: link.short_code,
        rotation_type: link.rotation_type,
        destinations,
    }))
}

/// Partially updates one destination.
///
/// # Endpoint
///
/// `PATCH /api/rotation/destinations/{id}` (owner or admin)
///
/// `label` distinguishes omitted (unchanged) from explicit null (cleared).
pub async fn update_destination_handler(
    Path(destination_id): Path<i64>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<UpdateDestinationRequest>,
) -> Result<StatusCode, AppError> {
    payload.validate()?;
    let account = identity::require_account(&headers)?;

    let destination = find_destination(&state, destination_id).await?;
    require_link_access(&state, &account, destination.link_id).await?;

    let patch = RotationDestinationPatch {
        destination: payload.destination,
        weight: payload.weight,
        label: payload.label,
        is_active: payload.is_active,
    };
    if !state.rotation.update(destination_id, patch).await? {
        return Err(destination_not_found(destination_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// Removes one destination permanently (click history goes with it; prefer
/// `is_active = false` to pause).
///
/// # Endpoint
///
/// `DELETE /api/rotation/destinations/{id}` (owner or admin)
pub async fn delete_destination_handler(
    Path(destination_id): Path<i64>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    let account = identity::require_account(&headers)?;

    let destination = find_destination(&state, destination_id).await?;
    require_link_access(&state, &account, destination.link_id).await?;

    if !state.rotation.delete(destination_id).await? {
        return Err(destination_not_found(destination_id));
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn find_destination(
    state: &AppState,
    destination_id: i64,
) -> Result<RotationDestination, AppError> {
    state
        .rotation
        .find(destination_id)
        .await?
        .ok_or_else(|| destination_not_found(destination_id))
}

fn destination_not_found(destination_id: i64) -> AppError {
    AppError::not_found(
        "Rotation destination not found",
        json!({ "id": destination_id }),
    )
}

async fn require_link_access(
    state: &AppState,
    account: &str,
    link_id: i64,
) -> Result<(), AppError> {
    if state.config.is_admin(account) || state.shortener.is_owner(account, link_id).await? {
        return Ok(());
    }
    Err(AppError::forbidden(
        "Only the link owner can manage this rotation",
        json!({}),
    ))
}
