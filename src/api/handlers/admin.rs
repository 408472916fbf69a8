//! Admin moderation surface.
//!
//! Every handler gates on the configured admin allow-list first.

use axum::{
    Json,
    extract::{Path, State},
    http::{HeaderMap, StatusCode},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::admin::{
    BanDomainRequest, BanIpRequest, BanListResponse, FlagRequest, PendingReportsResponse,
    ResolveReportRequest,
};
use crate::api::middleware::identity;
use crate::application::services::AdminOverview;
use crate::domain::entities::ShortLink;
use crate::error::AppError;
use crate::state::AppState;

const PENDING_REPORTS_LIMIT: i64 = 50;

/// `GET /api/admin/reports` - pending reports, oldest first.
pub async fn list_reports_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<PendingReportsResponse>, AppError> {
    identity::require_admin(&headers, &state.config)?;
    let reports = state.reports.list_pending(PENDING_REPORTS_LIMIT).await?;
    Ok(Json(PendingReportsResponse { reports }))
}

/// `POST /api/admin/reports/{id}/resolve` - mark a report reviewed or
/// dismissed.
pub async fn resolve_report_handler(
    Path(report_id): Path<i64>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<ResolveReportRequest>,
) -> Result<StatusCode, AppError> {
    identity::require_admin(&headers, &state.config)?;
    state.reports.resolve(report_id, payload.status).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/admin/links/{code}/flag` - flag a link out of resolution.
pub async fn flag_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<FlagRequest>,
) -> Result<StatusCode, AppError> {
    identity::require_admin(&headers, &state.config)?;
    payload.validate()?;
    let link = find_link(&state, &code).await?;
    state.shortener.flag(&link, &payload.reason).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/admin/links/{code}/unflag` - reverse a flag.
pub async fn unflag_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    identity::require_admin(&headers, &state.config)?;
    let link = find_link(&state, &code).await?;
    state.shortener.unflag(&link).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/admin/links/{code}` - destroy a link regardless of owners.
pub async fn delete_link_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    identity::require_admin(&headers, &state.config)?;
    let link = find_link(&state, &code).await?;
    state.shortener.force_delete(&link).await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/admin/bans/ips` - add an IP to the deny list.
pub async fn ban_ip_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<BanIpRequest>,
) -> Result<StatusCode, AppError> {
    identity::require_admin(&headers, &state.config)?;
    payload.validate()?;
    state
        .moderation
        .ban_ip(&payload.ip, payload.reason.clone())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/admin/bans/ips/{ip}` - lift an IP ban.
pub async fn unban_ip_handler(
    Path(ip): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    identity::require_admin(&headers, &state.config)?;
    if !state.moderation.unban_ip(&ip).await? {
        return Err(AppError::not_found("IP is not banned", json!({ "ip": ip })));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `POST /api/admin/bans/domains` - add a domain to the deny list.
pub async fn ban_domain_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
    Json(payload): Json<BanDomainRequest>,
) -> Result<StatusCode, AppError> {
    identity::require_admin(&headers, &state.config)?;
    payload.validate()?;
    state
        .moderation
        .ban_domain(&payload.domain, payload.reason.clone())
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

/// `DELETE /api/admin/bans/domains/{domain}` - lift a domain ban.
pub async fn unban_domain_handler(
    Path(domain): Path<String>,
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<StatusCode, AppError> {
    identity::require_admin(&headers, &state.config)?;
    if !state.moderation.unban_domain(&domain).await? {
        return Err(AppError::not_found(
            "Domain is not banned",
            json!({ "domain": domain }),
        ));
    }
    Ok(StatusCode::NO_CONTENT)
}

/// `GET /api/admin/bans` - both deny lists.
pub async fn list_bans_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<BanListResponse>, AppError> {
    identity::require_admin(&headers, &state.config)?;
    let (ips, domains) = state.moderation.list_bans().await?;
    Ok(Json(BanListResponse { ips, domains }))
}

/// `GET /api/admin/stats` - system-wide counters.
pub async fn admin_stats_handler(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<AdminOverview>, AppError> {
    identity::require_admin(&headers, &state.config)?;
    Ok(Json(state.stats.admin_overview().await?))
}

async fn find_link(state: &AppState, code: &str) -> Result<ShortLink, AppError> {
    state.shortener.find_by_code(code).await?.ok_or_else(|| {
        AppError::not_found("Short link not found", json!({ "code": code }))
    })
}
