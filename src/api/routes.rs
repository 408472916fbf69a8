//! API route configuration.

use axum::{
    Router,
    routing::{delete, get, patch, post},
};

use crate::api::handlers::{
    admin::{
        admin_stats_handler, ban_domain_handler, ban_ip_handler, delete_link_handler,
        flag_link_handler, list_bans_handler, list_reports_handler, resolve_report_handler,
        unban_domain_handler, unban_ip_handler, unflag_link_handler,
    },
    analytics::analytics_handler,
    keys::{create_key_handler, list_keys_handler, revoke_key_handler},
    password::verify_password_handler,
    report::report_handler,
    rotation::{
        create_rotation_handler, delete_destination_handler, rotation_stats_handler,
        update_destination_handler,
    },
    shorten::{detach_link_handler, shorten_handler},
    v1_shorten::v1_shorten_handler,
};
use crate::state::AppState;

/// Account-facing routes under `/api`, rate limited by the sliding window.
///
/// # Endpoints
///
/// - `POST   /shorten`                        - Create a short link
/// - `POST   /urls/{code}/verify-password`    - Unlock a gated link
/// - `GET    /urls/{code}/analytics`          - Owner analytics
/// - `DELETE /urls/{code}`                    - Detach the caller's ownership
/// - `POST   /report`                         - File an abuse report
/// - `POST   /rotation`                       - Create a rotation link
/// - `GET    /rotation/{code}`                - Rotation click breakdown
/// - `PATCH  /rotation/destinations/{id}`     - Update one destination
/// - `DELETE /rotation/destinations/{id}`     - Remove one destination
/// - `POST   /keys` / `GET /keys`             - Issue / list API keys
/// - `DELETE /keys/{id}`                      - Revoke an API key
/// - `/admin/*`                               - Allow-listed accounts only
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .route("/urls/{code}/verify-password", post(verify_password_handler))
        .route("/urls/{code}/analytics", get(analytics_handler))
        .route("/urls/{code}", delete(detach_link_handler))
        .route("/report", post(report_handler))
        .route("/rotation", post(create_rotation_handler))
        .route("/rotation/{code}", get(rotation_stats_handler))
        .route(
            "/rotation/destinations/{id}",
            patch(update_destination_handler).delete(delete_destination_handler),
        )
        .route("/keys", post(create_key_handler).get(list_keys_handler))
        .route("/keys/{id}", delete(revoke_key_handler))
        .merge(admin_routes())
}

/// Programmatic routes under `/api/v1`, authenticated by Bearer API key.
pub fn v1_routes() -> Router<AppState> {
    Router::new().route("/shorten", post(v1_shorten_handler))
}

fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/reports", get(list_reports_handler))
        .route("/admin/reports/{id}/resolve", post(resolve_report_handler))
        .route("/admin/links/{code}/flag", post(flag_link_handler))
        .route("/admin/links/{code}/unflag", post(unflag_link_handler))
        .route("/admin/links/{code}", delete(delete_link_handler))
        .route("/admin/bans", get(list_bans_handler))
        .route("/admin/bans/ips", post(ban_ip_handler))
        .route("/admin/bans/ips/{ip}", delete(unban_ip_handler))
        .route("/admin/bans/domains", post(ban_domain_handler))
        .route("/admin/bans/domains/{domain}", delete(unban_domain_handler))
        .route("/admin/stats", get(admin_stats_handler))
}
