//! Sliding-window rate limiting over the public API surface.

mod common;

use std::sync::Arc;

use common::{ScriptedScanner, spawn_app_with, test_config};
use serde_json::json;
use shortguard::prelude::Verdict;

fn small_window_app() -> common::TestApp {
    let mut config = test_config();
    config.rate_limit_max_requests = 3;
    spawn_app_with(
        config,
        vec![Arc::new(ScriptedScanner::new("stub", Verdict::Safe))],
    )
}

#[tokio::test]
async fn test_anonymous_window_exhausts_at_the_limit() {
    let app = small_window_app();

    for i in 0..3 {
        let response = app
            .server
            .post("/api/shorten")
            .add_header("x-forwarded-for", "198.51.100.7")
            .json(&json!({ "url": format!("https://example.com/{i}") }))
            .await;
        assert_eq!(response.status_code(), 201, "request {i} should pass");
        assert_eq!(
            response.header("x-ratelimit-limit").to_str().unwrap(),
            "3"
        );
        assert_eq!(
            response.header("x-ratelimit-remaining").to_str().unwrap(),
            (2 - i).to_string()
        );
    }

    let denied = app
        .server
        .post("/api/shorten")
        .add_header("x-forwarded-for", "198.51.100.7")
        .json(&json!({ "url": "https://example.com/overflow" }))
        .await;
    assert_eq!(denied.status_code(), 429);
}

#[tokio::test]
async fn test_identifiers_have_independent_windows() {
    let app = small_window_app();

    for i in 0..3 {
        app.server
            .post("/api/shorten")
            .add_header("x-forwarded-for", "198.51.100.7")
            .json(&json!({ "url": format!("https://example.com/a{i}") }))
            .await;
    }

    // A different client IP is untouched by the exhausted window.
    let response = app
        .server
        .post("/api/shorten")
        .add_header("x-forwarded-for", "203.0.113.9")
        .json(&json!({ "url": "https://example.com/other" }))
        .await;
    assert_eq!(response.status_code(), 201);
}

#[tokio::test]
async fn test_authenticated_callers_get_the_privileged_tier() {
    let app = small_window_app();

    let response = app
        .server
        .post("/api/shorten")
        .add_header("x-account-id", "acct-1")
        .add_header("x-forwarded-for", "198.51.100.7")
        .json(&json!({ "url": "https://example.com/page" }))
        .await;

    assert_eq!(response.status_code(), 201);
    // Privileged tier is five times the base limit.
    assert_eq!(
        response.header("x-ratelimit-limit").to_str().unwrap(),
        "15"
    );
}

#[tokio::test]
async fn test_banned_ip_is_rejected_unconditionally() {
    let app = small_window_app();
    app.bans.ban_ip_now("198.51.100.66");

    let response = app
        .server
        .post("/api/shorten")
        .add_header("x-forwarded-for", "198.51.100.66")
        .json(&json!({ "url": "https://example.com/page" }))
        .await;
    assert_eq!(response.status_code(), 429);
}

#[tokio::test]
async fn test_redirects_are_not_rate_limited() {
    let app = small_window_app();

    let body: serde_json::Value = app
        .server
        .post("/api/shorten")
        .add_header("x-forwarded-for", "198.51.100.7")
        .json(&json!({ "url": "https://example.com/hot" }))
        .await
        .json();
    let code = body["code"].as_str().unwrap().to_string();

    // Far past the API window; the redirect path carries no limiter.
    for _ in 0..10 {
        let response = app
            .server
            .get(&format!("/{code}"))
            .add_header("x-forwarded-for", "198.51.100.7")
            .await;
        assert_eq!(response.status_code(), 307);
    }
}
