//! Abuse report intake.

use std::net::SocketAddr;

use axum::{
    Json,
    extract::{ConnectInfo, State},
    http::{HeaderMap, StatusCode},
};
use serde_json::json;
use validator::Validate;

use crate::api::dto::report::{ReportRequest, ReportResponse};
use crate::api::middleware::identity;
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::client_ip::client_ip;
use crate::utils::hashing::hash_ip;

/// Files an abuse report against a short link.
///
/// # Endpoint
///
/// `POST /api/report`
///
/// Anonymous reporters are identified by their hashed IP so the one-report-
/// per-reporter rule holds without storing addresses. Reaching the
/// configured threshold flags the link.
pub async fn report_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    headers: HeaderMap,
    Json(payload): Json<ReportRequest>,
) -> Result<(StatusCode, Json<ReportResponse>), AppError> {
    payload.validate()?;

    let link = state
        .shortener
        .find_by_code(&payload.code)
        .await?
        .filter(|link| link.is_active)
        .ok_or_else(|| {
            AppError::not_found("Short link not found", json!({ "code": payload.code }))
        })?;

    let reporter = match identity::account_id(&headers) {
        Some(account) => account,
        None => hash_ip(&client_ip(&headers, &addr), &state.config.ip_hash_salt),
    };

    let report = state
        .reports
        .submit(&link, &reporter, &payload.reason)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(ReportResponse {
            report_id: report.id,
            status: "PENDING",
        }),
    ))
}
