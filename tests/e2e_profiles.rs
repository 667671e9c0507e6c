//! E2E tests for profile and current-user procedures

mod common;

use common::TestServer;
use serde_json::{Value, json};

#[tokio::test]
async fn test_get_user_by_name() {
    let server = TestServer::new().await;
    server.create_test_user("user-1", Some("ferris")).await;

    let response = server
        .client
        .get(server.query_url("profiles.getUserByName", &json!({ "name": "ferris" })))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(
        json["result"]["data"],
        json!({
            "id": "user-1",
            "name": "ferris",
            "image": "https://cdn.example.com/user-1.png"
        })
    );
}

#[tokio::test]
async fn test_get_user_by_name_is_exact() {
    let server = TestServer::new().await;
    server.create_test_user("user-1", Some("ferris")).await;

    let response = server
        .client
        .get(server.query_url("profiles.getUserByName", &json!({ "name": "Ferris" })))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
}

#[tokio::test]
async fn test_get_user_by_name_not_found() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.query_url("profiles.getUserByName", &json!({ "name": "nobody" })))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 500);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"]["code"], "INTERNAL_SERVER_ERROR");
    assert_eq!(json["error"]["message"], "User not found");
}

#[tokio::test]
async fn test_by_user_id_requires_session() {
    let server = TestServer::new().await;

    let response = server
        .client
        .get(server.url("/api/trpc/users.byUserId"))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 401);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["error"]["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn test_by_user_id_returns_session_user() {
    let server = TestServer::new().await;
    server.create_test_user("user-1", Some("ferris")).await;
    let token = server.create_test_token("user-1");

    let response = server
        .client
        .get(server.url("/api/trpc/users.byUserId"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json["result"]["data"]["id"], "user-1");
    assert_eq!(json["result"]["data"]["name"], "ferris");
}

#[tokio::test]
async fn test_by_user_id_for_missing_user_is_null() {
    let server = TestServer::new().await;
    let token = server.create_test_token("ghost");

    let response = server
        .client
        .get(server.url("/api/trpc/users.byUserId"))
        .header("Authorization", format!("Bearer {}", token))
        .send()
        .await
        .unwrap();

    assert_eq!(response.status(), 200);
    let json: Value = response.json().await.unwrap();
    assert_eq!(json, json!({ "result": { "data": null } }));
}
