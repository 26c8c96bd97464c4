//! API key request, use, listing and revocation over HTTP.

mod common;

use axum::http::StatusCode;
use serde_json::json;

use memberhub_auth::jwt::hash_token;

use common::*;

fn google(email: &str) -> String {
    format!("google:{email}")
}

#[tokio::test]
async fn test_request_key_requires_google_token() {
    let app = TestApp::new().await;
    let body = json!({ "email": email(MEM), "allowed_origin": "https://a.example.org" });

    let response = app
        .send(
            axum::http::Request::builder()
                .method("POST")
                .uri("/request-key")
                .header("content-type", "application/json")
                .body(axum::body::Body::from(body.to_string()))
                .unwrap(),
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["message"], "Authorization header is required");

    let response = app
        .send(with_bearer("POST", "/request-key", "forged", Some(body)))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_request_key_forbidden_for_regular_member() {
    let app = TestApp::new().await;
    let response = app
        .send(with_bearer(
            "POST",
            "/request-key",
            &google(email(MEM)),
            Some(json!({ "email": email(MEM), "allowed_origin": "https://a.example.org" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert!(app.api_keys.all().await.is_empty());
}

#[tokio::test]
async fn test_request_key_body_validated() {
    let app = TestApp::new().await;
    let response = app
        .send(with_bearer(
            "POST",
            "/request-key",
            &google(email(AVP_RND)),
            Some(json!({ "email": "not-an-email" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["error"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_issued_key_authenticates_integration_routes() {
    let app = TestApp::new().await;
    let response = app
        .send(with_bearer(
            "POST",
            "/request-key",
            &google(email(AVP_RND)),
            Some(json!({
                "email": email(AVP_RND),
                "project": "attendance",
                "allowed_origin": "https://attendance.example.org"
            })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let api_key = body["data"]["api_key"].as_str().unwrap().to_string();
    assert_eq!(body["data"]["email"], email(AVP_RND));
    assert!(body["data"]["expires_at"].is_string());

    let stored = app.api_keys.all().await;
    assert_eq!(stored[0].api_key_hash, hash_token(&api_key));

    let response = app
        .send(with_bearer("GET", "/members/me", &api_key, None))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["data"]["id"], AVP_RND);

    // Flip a character in the middle of the signature.
    let mut tampered = api_key.into_bytes();
    let pos = tampered.len() - 10;
    tampered[pos] = if tampered[pos] == b'A' { b'B' } else { b'A' };
    let tampered = String::from_utf8(tampered).unwrap();
    let response = app
        .send(with_bearer("GET", "/members/me", &tampered, None))
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_api_key_for_unprivileged_member_is_forbidden() {
    let app = TestApp::new().await;
    let response = app
        .send(with_bearer(
            "POST",
            "/request-key",
            &google(email(AVP_RND)),
            Some(json!({ "email": email(MEM), "is_admin": true })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert!(body["data"].get("expires_at").is_none());
    let api_key = body["data"]["api_key"].as_str().unwrap();

    // Valid signature, but the owner has no API access.
    let response = app
        .send(with_bearer("GET", "/members/me", api_key, None))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_duplicate_origin_conflicts() {
    let app = TestApp::new().await;
    let request = |email: &str| {
        with_bearer(
            "POST",
            "/request-key",
            &google("avp@example.org"),
            Some(json!({ "email": email, "allowed_origin": "https://shared.example.org" })),
        )
    };

    assert_eq!(app.send(request(email(AVP_RND))).await.status(), StatusCode::OK);
    let response = app.send(request(email(PRES))).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    assert_eq!(
        json_body(response).await["message"],
        "API key for origin https://shared.example.org already exists"
    );
}

#[tokio::test]
async fn test_list_and_revoke_keys() {
    let app = TestApp::new().await;
    let response = app
        .send(with_bearer(
            "POST",
            "/request-key",
            &google(email(AVP_RND)),
            Some(json!({ "email": email(AVP_RND), "is_dev": true, "allowed_origin": "http://localhost:5173" })),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);

    let session = app.login(AVP_RND).await;
    let response = app.send(with_session("GET", "/api-keys", &session)).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    let keys = body["data"].as_array().unwrap();
    assert_eq!(keys.len(), 1);
    assert_eq!(keys[0]["key_type"], "dev");
    assert!(keys[0].get("api_key_hash").is_none());
    let id = keys[0]["id"].as_i64().unwrap();

    // A privileged member who does not own the key cannot revoke it.
    let admin = app.login(ADMIN).await;
    let response = app
        .send(with_session("DELETE", &format!("/api-keys/{id}"), &admin))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(with_session("DELETE", &format!("/api-keys/{id}"), &session))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(app.api_keys.all().await.is_empty());
}

#[tokio::test]
async fn test_key_management_requires_privilege() {
    let app = TestApp::new().await;
    let session = app.login(MEM).await;

    let response = app.send(with_session("GET", "/api-keys", &session)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.send(with_session("DELETE", "/api-keys/1", &session)).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app.send(get("/api-keys")).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
