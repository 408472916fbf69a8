//! Owner analytics endpoint.

use axum::{
    Json,
    extract::{Path, State},
    http::HeaderMap,
};
use serde_json::json;

use crate::api::dto::links::AnalyticsResponse;
use crate::api::middleware::identity;
use crate::error::AppError;
use crate::state::AppState;

const RECENT_CLICKS_LIMIT: i64 = 50;
const HEALTH_HISTORY_LIMIT: i64 = 10;

/// Returns click analytics and scan history for an owned link.
///
/// # Endpoint
///
/// `GET /api/urls/{code}/analytics` (owner or admin)
pub async fn analytics_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AnalyticsResponse>, AppError> {
    let account = identity::require_account(&headers)?;

    let link = state.shortener.find_by_code(&code).await?.ok_or_else(|| {
        AppError::not_found("Short link not found", json!({ "code": code }))
    })?;

    if !state.config.is_admin(&account) && !state.shortener.is_owner(&account, link.id).await? {
        return Err(AppError::forbidden(
            "Only the link owner can view analytics",
            json!({ "code": code }),
        ));
    }

    let stats = state.stats.link_stats(link.id, RECENT_CLICKS_LIMIT).await?;
    let health_checks = state.health.history(link.id, HEALTH_HISTORY_LIMIT).await?;
    let total_clicks = stats.analytics.as_ref().map_or(0, |a| a.clicks);
    let last_click = stats.analytics.as_ref().and_then(|a| a.last_click);

    Ok(Json(AnalyticsResponse {
        code: link.short_code,
        total_clicks,
        last_click,
        health_checks,
        stats,
    }))
}
