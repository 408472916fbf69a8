//! Password-gated links: gate response, verification, and the cookie.

mod common;

use common::spawn_app;
use serde_json::{Value, json};

async fn create_gated(app: &common::TestApp) -> String {
    let body: Value = app
        .server
        .post("/api/shorten")
        .add_header("x-account-id", "acct-1")
        .json(&json!({
            "url": "https://example.com/secret",
            "password": "hunter22"
        }))
        .await
        .json();
    body["code"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_gated_link_demands_password() {
    let app = spawn_app();
    let code = create_gated(&app).await;

    let response = app.server.get(&format!("/{code}")).await;
    assert_eq!(response.status_code(), 401);
    let body: Value = response.json();
    assert_eq!(body["password_required"], json!(true));
    assert_eq!(body["code"].as_str().unwrap(), code);
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let app = spawn_app();
    let code = create_gated(&app).await;

    let response = app
        .server
        .post(&format!("/api/urls/{code}/verify-password"))
        .json(&json!({ "password": "wrong-guess" }))
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_correct_password_issues_cookie_that_unlocks_redirect() {
    let app = spawn_app();
    let code = create_gated(&app).await;

    let verify = app
        .server
        .post(&format!("/api/urls/{code}/verify-password"))
        .json(&json!({ "password": "hunter22" }))
        .await;
    assert_eq!(verify.status_code(), 200);
    let body: Value = verify.json();
    assert_eq!(body["verified"], json!(true));

    let set_cookie = verify.header("set-cookie").to_str().unwrap().to_string();
    assert!(set_cookie.starts_with(&format!("gate_{code}=")));
    assert!(set_cookie.contains("HttpOnly"));
    let cookie_pair = set_cookie.split(';').next().unwrap().to_string();

    let redirect = app
        .server
        .get(&format!("/{code}"))
        .add_header("cookie", cookie_pair)
        .await;
    assert_eq!(redirect.status_code(), 307);
    assert_eq!(
        redirect.header("location").to_str().unwrap(),
        "https://example.com/secret"
    );
}

#[tokio::test]
async fn test_cookie_for_one_code_does_not_unlock_another() {
    let app = spawn_app();
    let first = create_gated(&app).await;

    let body: Value = app
        .server
        .post("/api/shorten")
        .add_header("x-account-id", "acct-1")
        .json(&json!({
            "url": "https://example.com/other-secret",
            "password": "hunter22"
        }))
        .await
        .json();
    let second = body["code"].as_str().unwrap().to_string();

    let verify = app
        .server
        .post(&format!("/api/urls/{first}/verify-password"))
        .json(&json!({ "password": "hunter22" }))
        .await;
    let set_cookie = verify.header("set-cookie").to_str().unwrap().to_string();
    let token = set_cookie
        .split(';')
        .next()
        .unwrap()
        .split('=')
        .nth(1)
        .unwrap()
        .to_string();

    // Present the first link's token under the second link's cookie name.
    let response = app
        .server
        .get(&format!("/{second}"))
        .add_header("cookie", format!("gate_{second}={token}"))
        .await;
    assert_eq!(response.status_code(), 401);
}

#[tokio::test]
async fn test_verify_on_plain_link_is_rejected() {
    let app = spawn_app();

    let body: Value = app
        .server
        .post("/api/shorten")
        .json(&json!({ "url": "https://example.com/open" }))
        .await
        .json();
    let code = body["code"].as_str().unwrap().to_string();

    let response = app
        .server
        .post(&format!("/api/urls/{code}/verify-password"))
        .json(&json!({ "password": "whatever" }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_preview_never_reveals_destination_password_state_only() {
    let app = spawn_app();
    let code = create_gated(&app).await;

    let preview = app.server.get(&format!("/{code}?preview=1")).await;
    assert_eq!(preview.status_code(), 200);
    let meta: Value = preview.json();
    assert_eq!(meta["is_password_protected"], json!(true));
    assert!(meta.get("destination").is_none());
    assert!(meta.get("password_hash").is_none());

    // Social-bot user agents go through the same preview branch.
    let bot = app
        .server
        .get(&format!("/{code}"))
        .add_header("user-agent", "facebookexternalhit/1.1")
        .await;
    assert_eq!(bot.status_code(), 200);
    let meta: Value = bot.json();
    assert!(meta.get("destination").is_none());
}

#[tokio::test]
async fn test_preview_reveals_destination_once_unlocked() {
    let app = spawn_app();
    let code = create_gated(&app).await;

    let verify = app
        .server
        .post(&format!("/api/urls/{code}/verify-password"))
        .json(&json!({ "password": "hunter22" }))
        .await;
    let set_cookie = verify.header("set-cookie").to_str().unwrap().to_string();
    let cookie_pair = set_cookie.split(';').next().unwrap().to_string();

    let preview = app
        .server
        .get(&format!("/{code}?preview=1"))
        .add_header("cookie", cookie_pair)
        .await;
    assert_eq!(preview.status_code(), 200);
    let meta: Value = preview.json();
    assert_eq!(meta["destination"], json!("https://example.com/secret"));
}
