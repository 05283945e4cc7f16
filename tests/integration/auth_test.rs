//! Integration tests for registration, login and the profile endpoints.

mod helpers;

use axum::http::StatusCode;
use helpers::{PASSWORD, TestApp};

#[tokio::test]
async fn test_register_and_login() {
    let app = TestApp::new().await;

    let response = app.register("alice").await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.data()["username"], "alice");
    assert_eq!(response.data()["role"], "user");
    assert!(response.data().get("password_hash").is_none());

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "alice", "password": PASSWORD })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.data()["token"].as_str().is_some());
    assert!(response.data()["expires_at"].as_str().is_some());
    assert_eq!(response.data()["user"]["username"], "alice");
}

#[tokio::test]
async fn test_register_duplicate_username() {
    let app = TestApp::new().await;
    app.create_user("bob").await;

    let response = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "username": "bob",
                "email": "other@test.com",
                "password": PASSWORD,
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "CONFLICT");
}

#[tokio::test]
async fn test_register_rejects_weak_password_and_bad_email() {
    let app = TestApp::new().await;

    let weak = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "username": "carol",
                "email": "carol@test.com",
                "password": "password",
            })),
            None,
        )
        .await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);
    assert_eq!(weak.error_code(), "INVALID_INPUT");

    let bad_email = app
        .request(
            "POST",
            "/api/auth/register",
            Some(serde_json::json!({
                "username": "carol",
                "email": "not-an-email",
                "password": PASSWORD,
            })),
            None,
        )
        .await;
    assert_eq!(bad_email.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = TestApp::new().await;
    app.create_user("dave").await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "dave", "password": "Wr0ng!pass" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["message"], "Invalid username or password");
}

#[tokio::test]
async fn test_login_throttled_after_repeated_failures() {
    let app = TestApp::new().await;
    app.create_user("erin").await;

    for _ in 0..5 {
        let response = app
            .request(
                "POST",
                "/api/auth/login",
                Some(serde_json::json!({ "username": "erin", "password": "Wr0ng!pass" })),
                None,
            )
            .await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    // Correct credentials are refused while the window is full.
    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "erin", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(response.error_code(), "RATE_LIMITED");
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new().await;

    let missing = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(missing.status, StatusCode::UNAUTHORIZED);

    let garbage = app
        .request("GET", "/api/auth/me", None, Some("not.a.token"))
        .await;
    assert_eq!(garbage.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_authenticated() {
    let app = TestApp::new().await;
    let (id, token) = app.create_user("frank").await;

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["id"], id.to_string());
    assert_eq!(response.data()["username"], "frank");
    assert_eq!(response.data()["is_super_admin"], false);
    assert_eq!(response.data()["storage_used"], 0);
}

#[tokio::test]
async fn test_change_password() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("grace").await;

    let wrong = app
        .request(
            "POST",
            "/api/auth/change-password",
            Some(serde_json::json!({
                "current_password": "Wr0ng!pass",
                "new_password": "N3w!Password",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(wrong.status, StatusCode::UNAUTHORIZED);

    let ok = app
        .request(
            "POST",
            "/api/auth/change-password",
            Some(serde_json::json!({
                "current_password": PASSWORD,
                "new_password": "N3w!Password",
            })),
            Some(&token),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);

    app.login("grace", "N3w!Password").await;
    let old = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "grace", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(old.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_set_language() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("heidi").await;

    let ok = app
        .request(
            "PUT",
            "/api/user/language",
            Some(serde_json::json!({ "language": "pt-BR" })),
            Some(&token),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);
    assert_eq!(ok.data()["language"], "pt-BR");

    let bad = app
        .request(
            "PUT",
            "/api/user/language",
            Some(serde_json::json!({ "language": "x" })),
            Some(&token),
        )
        .await;
    assert_eq!(bad.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_health_is_public() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["status"], "ok");
    assert_eq!(response.data()["database"]["provider"], "memory");
    assert_eq!(response.data()["storage"]["healthy"], true);
}
