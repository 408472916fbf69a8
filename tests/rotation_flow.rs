//! Rotation links: creation, destination selection, and management.

mod common;

use common::spawn_app;
use serde_json::{Value, json};

async fn create_sequential(app: &common::TestApp) -> String {
    let response = app
        .server
        .post("/api/rotation")
        .add_header("x-account-id", "acct-1")
        .json(&json!({
            "url": "https://example.com/primary",
            "rotation_type": "SEQUENTIAL",
            "destinations": [
                { "url": "https://example.com/variant-a" },
                { "url": "https://example.com/variant-b" }
            ]
        }))
        .await;
    assert_eq!(response.status_code(), 201);

    let body: Value = response.json();
    assert_eq!(body["rotation_type"], json!("SEQUENTIAL"));
    assert_eq!(body["destinations"], json!(2));
    body["code"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_sequential_rotation_alternates_destinations() {
    let app = spawn_app();
    let code = create_sequential(&app).await;

    let mut seen = Vec::new();
    for _ in 0..4 {
        let response = app.server.get(&format!("/{code}")).await;
        assert_eq!(response.status_code(), 307);
        seen.push(response.header("location").to_str().unwrap().to_string());
    }

    assert_eq!(
        seen,
        vec![
            "https://example.com/variant-a",
            "https://example.com/variant-b",
            "https://example.com/variant-a",
            "https://example.com/variant-b",
        ]
    );
}

#[tokio::test]
async fn test_rotation_requires_two_destinations() {
    let app = spawn_app();

    let response = app
        .server
        .post("/api/rotation")
        .add_header("x-account-id", "acct-1")
        .json(&json!({
            "url": "https://example.com/primary",
            "rotation_type": "RANDOM",
            "destinations": [ { "url": "https://example.com/only" } ]
        }))
        .await;
    assert_eq!(response.status_code(), 400);
}

#[tokio::test]
async fn test_rotation_stats_show_click_breakdown() {
    let app = spawn_app();
    let code = create_sequential(&app).await;

    app.server.get(&format!("/{code}")).await;
    app.server.get(&format!("/{code}")).await;
    app.server.get(&format!("/{code}")).await;

    let stats: Value = app
        .server
        .get(&format!("/api/rotation/{code}"))
        .add_header("x-account-id", "acct-1")
        .await
        .json();

    let destinations = stats["destinations"].as_array().unwrap();
    assert_eq!(destinations.len(), 2);
    assert_eq!(destinations[0]["clicks"], json!(2));
    assert_eq!(destinations[1]["clicks"], json!(1));
}

#[tokio::test]
async fn test_rotation_stats_require_ownership() {
    let app = spawn_app();
    let code = create_sequential(&app).await;

    let response = app
        .server
        .get(&format!("/api/rotation/{code}"))
        .add_header("x-account-id", "acct-2")
        .await;
    assert_eq!(response.status_code(), 403);

    // Admin accounts read any rotation.
    let response = app
        .server
        .get(&format!("/api/rotation/{code}"))
        .add_header("x-account-id", "admin-1")
        .await;
    assert_eq!(response.status_code(), 200);
}

#[tokio::test]
async fn test_disabled_destination_is_never_selected() {
    let app = spawn_app();
    let code = create_sequential(&app).await;

    let destination_id = app.rotations.destinations.lock().unwrap()[0].id;
    let response = app
        .server
        .patch(&format!("/api/rotation/destinations/{destination_id}"))
        .add_header("x-account-id", "acct-1")
        .json(&json!({ "is_active": false }))
        .await;
    assert_eq!(response.status_code(), 204);

    for _ in 0..4 {
        let redirect = app.server.get(&format!("/{code}")).await;
        assert_eq!(
            redirect.header("location").to_str().unwrap(),
            "https://example.com/variant-b"
        );
    }
}

#[tokio::test]
async fn test_all_destinations_disabled_falls_back_to_primary() {
    let app = spawn_app();
    let code = create_sequential(&app).await;

    for destination in app.rotations.destinations.lock().unwrap().iter_mut() {
        destination.is_active = false;
    }

    let redirect = app.server.get(&format!("/{code}")).await;
    assert_eq!(redirect.status_code(), 307);
    assert_eq!(
        redirect.header("location").to_str().unwrap(),
        "https://example.com/primary"
    );
}

#[tokio::test]
async fn test_delete_destination_requires_ownership() {
    let app = spawn_app();
    create_sequential(&app).await;

    let destination_id = app.rotations.destinations.lock().unwrap()[0].id;

    let response = app
        .server
        .delete(&format!("/api/rotation/destinations/{destination_id}"))
        .add_header("x-account-id", "acct-2")
        .await;
    assert_eq!(response.status_code(), 403);

    let response = app
        .server
        .delete(&format!("/api/rotation/destinations/{destination_id}"))
        .add_header("x-account-id", "acct-1")
        .await;
    assert_eq!(response.status_code(), 204);
    assert_eq!(app.rotations.destinations.lock().unwrap().len(), 1);
}
