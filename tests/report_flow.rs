//! Abuse reports: intake, duplicate rejection, and the auto-flag threshold.

mod common;

use common::spawn_app;
use serde_json::{Value, json};

async fn create_link(app: &common::TestApp) -> String {
    let body: Value = app
        .server
        .post("/api/shorten")
        .add_header("x-account-id", "acct-1")
        .json(&json!({ "url": "https://example.com/reported" }))
        .await
        .json();
    body["code"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_report_is_accepted_as_pending() {
    let app = spawn_app();
    let code = create_link(&app).await;

    let response = app
        .server
        .post("/api/report")
        .add_header("x-account-id", "acct-2")
        .json(&json!({ "code": code, "reason": "spam destination" }))
        .await;

    assert_eq!(response.status_code(), 201);
    let body: Value = response.json();
    assert_eq!(body["status"], json!("PENDING"));
}

#[tokio::test]
async fn test_duplicate_report_conflicts() {
    let app = spawn_app();
    let code = create_link(&app).await;

    app.server
        .post("/api/report")
        .add_header("x-account-id", "acct-2")
        .json(&json!({ "code": code, "reason": "spam destination" }))
        .await;

    let response = app
        .server
        .post("/api/report")
        .add_header("x-account-id", "acct-2")
        .json(&json!({ "code": code, "reason": "still spam" }))
        .await;
    assert_eq!(response.status_code(), 409);
}

#[tokio::test]
async fn test_threshold_flags_the_link() {
    let app = spawn_app();
    let code = create_link(&app).await;

    // Threshold is 2 in the test config; distinct reporters count.
    app.server
        .post("/api/report")
        .add_header("x-account-id", "acct-2")
        .json(&json!({ "code": code, "reason": "phishing" }))
        .await;

    assert_eq!(app.server.get(&format!("/{code}")).await.status_code(), 307);

    let response = app
        .server
        .post("/api/report")
        .add_header("x-account-id", "acct-3")
        .json(&json!({ "code": code, "reason": "phishing" }))
        .await;
    assert_eq!(response.status_code(), 201);

    // The second report crossed the threshold; the link no longer resolves.
    let link = app.links.by_code(&code).unwrap();
    assert!(link.is_flagged);
    assert_eq!(app.server.get(&format!("/{code}")).await.status_code(), 404);
}

#[tokio::test]
async fn test_anonymous_reporters_are_deduplicated_by_ip() {
    let app = spawn_app();
    let code = create_link(&app).await;

    let first = app
        .server
        .post("/api/report")
        .add_header("x-forwarded-for", "198.51.100.7")
        .json(&json!({ "code": code, "reason": "spam" }))
        .await;
    assert_eq!(first.status_code(), 201);

    let duplicate = app
        .server
        .post("/api/report")
        .add_header("x-forwarded-for", "198.51.100.7")
        .json(&json!({ "code": code, "reason": "spam again" }))
        .await;
    assert_eq!(duplicate.status_code(), 409);
}

#[tokio::test]
async fn test_report_against_unknown_code_is_not_found() {
    let app = spawn_app();

    let response = app
        .server
        .post("/api/report")
        .json(&json!({ "code": "missing1", "reason": "spam" }))
        .await;
    assert_eq!(response.status_code(), 404);
}
