//! Admin moderation surface and the service health endpoint.

mod common;

use common::spawn_app;
use serde_json::{Value, json};

async fn create_link(app: &common::TestApp, url: &str) -> String {
    let body: Value = app
        .server
        .post("/api/shorten")
        .add_header("x-account-id", "acct-1")
        .json(&json!({ "url": url }))
        .await
        .json();
    body["code"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_admin_surface_rejects_non_admins() {
    let app = spawn_app();

    let response = app.server.get("/api/admin/stats").await;
    assert_eq!(response.status_code(), 401);

    let response = app
        .server
        .get("/api/admin/stats")
        .add_header("x-account-id", "acct-1")
        .await;
    assert_eq!(response.status_code(), 403);
}

#[tokio::test]
async fn test_flag_and_unflag_cycle() {
    let app = spawn_app();
    let code = create_link(&app, "https://example.com/suspect").await;

    let response = app
        .server
        .post(&format!("/api/admin/links/{code}/flag"))
        .add_header("x-account-id", "admin-1")
        .json(&json!({ "reason": "manual review: phishing" }))
        .await;
    assert_eq!(response.status_code(), 204);
    assert_eq!(app.server.get(&format!("/{code}")).await.status_code(), 404);

    let response = app
        .server
        .post(&format!("/api/admin/links/{code}/unflag"))
        .add_header("x-account-id", "admin-1")
        .await;
    assert_eq!(response.status_code(), 204);
    assert_eq!(app.server.get(&format!("/{code}")).await.status_code(), 307);
}

#[tokio::test]
async fn test_force_delete_destroys_the_link() {
    let app = spawn_app();
    let code = create_link(&app, "https://example.com/doomed").await;

    let response = app
        .server
        .delete(&format!("/api/admin/links/{code}"))
        .add_header("x-account-id", "admin-1")
        .await;
    assert_eq!(response.status_code(), 204);

    assert!(app.links.by_code(&code).is_none());
    assert_eq!(app.server.get(&format!("/{code}")).await.status_code(), 404);
}

#[tokio::test]
async fn test_ban_list_roundtrip() {
    let app = spawn_app();

    let response = app
        .server
        .post("/api/admin/bans/ips")
        .add_header("x-account-id", "admin-1")
        .json(&json!({ "ip": "198.51.100.66", "reason": "abuse" }))
        .await;
    assert_eq!(response.status_code(), 204);

    let response = app
        .server
        .post("/api/admin/bans/domains")
        .add_header("x-account-id", "admin-1")
        .json(&json!({ "domain": "evil-corp.example", "reason": "malware host" }))
        .await;
    assert_eq!(response.status_code(), 204);

    let bans: Value = app
        .server
        .get("/api/admin/bans")
        .add_header("x-account-id", "admin-1")
        .await
        .json();
    assert_eq!(bans["ips"][0]["ip"], json!("198.51.100.66"));
    assert_eq!(bans["domains"][0]["domain"], json!("evil-corp.example"));

    // Banned domains now fail shortening.
    let response = app
        .server
        .post("/api/shorten")
        .json(&json!({ "url": "https://evil-corp.example/payload" }))
        .await;
    assert_eq!(response.status_code(), 403);

    let response = app
        .server
        .delete("/api/admin/bans/ips/198.51.100.66")
        .add_header("x-account-id", "admin-1")
        .await;
    assert_eq!(response.status_code(), 204);

    let response = app
        .server
        .delete("/api/admin/bans/ips/198.51.100.66")
        .add_header("x-account-id", "admin-1")
        .await;
    assert_eq!(response.status_code(), 404);
}

#[tokio::test]
async fn test_report_queue_resolution() {
    let app = spawn_app();
    let code = create_link(&app, "https://example.com/reported").await;

    app.server
        .post("/api/report")
        .add_header("x-account-id", "acct-2")
        .json(&json!({ "code": code, "reason": "looks like spam" }))
        .await;

    let pending: Value = app
        .server
        .get("/api/admin/reports")
        .add_header("x-account-id", "admin-1")
        .await
        .json();
    let reports = pending["reports"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    let report_id = reports[0]["id"].as_i64().unwrap();

    let response = app
        .server
        .post(&format!("/api/admin/reports/{report_id}/resolve"))
        .add_header("x-account-id", "admin-1")
        .json(&json!({ "status": "DISMISSED" }))
        .await;
    assert_eq!(response.status_code(), 204);

    let pending: Value = app
        .server
        .get("/api/admin/reports")
        .add_header("x-account-id", "admin-1")
        .await
        .json();
    assert!(pending["reports"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_admin_stats_aggregate_counts() {
    let app = spawn_app();
    let code = create_link(&app, "https://example.com/one").await;
    create_link(&app, "https://example.com/two").await;

    app.server.get(&format!("/{code}")).await;
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;

    let stats: Value = app
        .server
        .get("/api/admin/stats")
        .add_header("x-account-id", "admin-1")
        .await
        .json();
    assert_eq!(stats["active_links"], json!(2));
    assert_eq!(stats["flagged_links"], json!(0));
    assert_eq!(stats["total_clicks"], json!(1));
    assert_eq!(stats["pending_reports"], json!(0));
}

#[tokio::test]
async fn test_health_reports_degraded_without_database() {
    let app = spawn_app();

    let response = app.server.get("/health").await;
    assert_eq!(response.status_code(), 503);

    let body: Value = response.json();
    assert_eq!(body["status"], json!("degraded"));
    assert_eq!(body["checks"]["database"]["status"], json!("error"));
    assert_eq!(body["checks"]["click_queue"]["status"], json!("ok"));
}
