//! Integration tests for the admin endpoints.

mod helpers;

use axum::http::StatusCode;
use helpers::{PASSWORD, ROOT, TestApp};
use uuid::Uuid;

async fn root_id(app: &TestApp, root: &str) -> Uuid {
    let me = app.request("GET", "/api/auth/me", None, Some(root)).await;
    me.id()
}

#[tokio::test]
async fn test_regular_user_is_forbidden() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("alice").await;

    for (method, path) in [
        ("GET", "/api/admin/users"),
        ("GET", "/api/admin/security-logs"),
        ("GET", "/api/admin/features/extension-blocklist"),
    ] {
        let response = app.request(method, path, None, Some(&token)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{path}");
    }

    // Forbidden even when the target does not exist.
    let response = app
        .request(
            "DELETE",
            &format!("/api/admin/delete-user/{}", Uuid::new_v4()),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_list_users_with_counts() {
    let app = TestApp::new().await;
    let root = app.root_token().await;
    let (bob, token) = app.create_user("bob").await;
    app.create_folder(&token, "Docs", None).await;
    app.upload_ok(&token, "a.txt", None, b"abc").await;

    let response = app.request("GET", "/api/admin/users", None, Some(&root)).await;

    assert_eq!(response.status, StatusCode::OK);
    let users = response.data().as_array().unwrap();
    assert_eq!(users.len(), 2);
    let row = users
        .iter()
        .find(|u| u["id"] == bob.to_string())
        .expect("bob listed");
    assert_eq!(row["file_count"], 1);
    assert_eq!(row["folder_count"], 1);
    assert_eq!(row["storage_used"], 3);
    assert!(row.get("password_hash").is_none());
}

#[tokio::test]
async fn test_admins_cannot_touch_other_admins_or_root() {
    let app = TestApp::new().await;
    let root = app.root_token().await;
    let root_id = root_id(&app, &root).await;
    let (_, admin) = app.create_admin("carol").await;
    let (other_admin, _) = app.create_admin("dave").await;

    let demote = app
        .request(
            "POST",
            "/api/admin/change-role",
            Some(serde_json::json!({ "user_id": other_admin, "role": "user" })),
            Some(&admin),
        )
        .await;
    assert_eq!(demote.status, StatusCode::FORBIDDEN);

    let reset_root = app
        .request(
            "POST",
            "/api/admin/change-password",
            Some(serde_json::json!({ "user_id": root_id, "new_password": "N3w!Password" })),
            Some(&admin),
        )
        .await;
    assert_eq!(reset_root.status, StatusCode::FORBIDDEN);

    // The super-admin may manage admins.
    let demote = app
        .request(
            "POST",
            "/api/admin/change-role",
            Some(serde_json::json!({ "user_id": other_admin, "role": "user" })),
            Some(&root),
        )
        .await;
    assert_eq!(demote.status, StatusCode::OK);
    assert_eq!(demote.data()["role"], "user");

    // ...but not itself.
    let delete_root = app
        .request(
            "DELETE",
            &format!("/api/admin/delete-user/{root_id}"),
            None,
            Some(&root),
        )
        .await;
    assert_eq!(delete_root.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_demoted_admin_loses_access_immediately() {
    let app = TestApp::new().await;
    let root = app.root_token().await;
    let (erin, token) = app.create_admin("erin").await;

    let allowed = app.request("GET", "/api/admin/users", None, Some(&token)).await;
    assert_eq!(allowed.status, StatusCode::OK);

    app.request(
        "POST",
        "/api/admin/change-role",
        Some(serde_json::json!({ "user_id": erin, "role": "user" })),
        Some(&root),
    )
    .await;

    // Same token, role re-read from the record store.
    let denied = app.request("GET", "/api/admin/users", None, Some(&token)).await;
    assert_eq!(denied.status, StatusCode::FORBIDDEN);

    // Ownership-scoped endpoints keep working.
    let tree = app.request("GET", "/api/folders/tree", None, Some(&token)).await;
    assert_eq!(tree.status, StatusCode::OK);
}

#[tokio::test]
async fn test_admin_password_reset() {
    let app = TestApp::new().await;
    let (_, admin) = app.create_admin("frank").await;
    let (grace, _) = app.create_user("grace").await;

    let weak = app
        .request(
            "POST",
            "/api/admin/change-password",
            Some(serde_json::json!({ "user_id": grace, "new_password": "short" })),
            Some(&admin),
        )
        .await;
    assert_eq!(weak.status, StatusCode::BAD_REQUEST);

    let ok = app
        .request(
            "POST",
            "/api/admin/change-password",
            Some(serde_json::json!({ "user_id": grace, "new_password": "N3w!Password" })),
            Some(&admin),
        )
        .await;
    assert_eq!(ok.status, StatusCode::OK);

    app.login("grace", "N3w!Password").await;
}

#[tokio::test]
async fn test_delete_user_cascades() {
    let app = TestApp::new().await;
    let root = app.root_token().await;
    let (heidi, token) = app.create_user("heidi").await;
    let folder = app.create_folder(&token, "Stuff", None).await;
    app.upload_ok(&token, "a.txt", Some(folder), b"abc").await;
    app.upload_ok(&token, "b.txt", None, b"defg").await;
    assert_eq!(app.blobs.len(), 2);

    let response = app
        .request(
            "DELETE",
            &format!("/api/admin/delete-user/{heidi}"),
            None,
            Some(&root),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert!(app.blobs.is_empty());

    let login = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({ "username": "heidi", "password": PASSWORD })),
            None,
        )
        .await;
    assert_eq!(login.status, StatusCode::UNAUTHORIZED);

    let users = app.request("GET", "/api/admin/users", None, Some(&root)).await;
    assert_eq!(users.data().as_array().unwrap().len(), 1);
    assert_eq!(users.data()[0]["username"], ROOT);
}

#[tokio::test]
async fn test_admin_cannot_delete_self() {
    let app = TestApp::new().await;
    let (ivan, token) = app.create_admin("ivan").await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/admin/delete-user/{ivan}"),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_OPERATION");
}

#[tokio::test]
async fn test_reconcile_storage_and_security_logs() {
    let app = TestApp::new().await;
    let root = app.root_token().await;
    let (judy, token) = app.create_user("judy").await;
    app.upload_ok(&token, "a.txt", None, b"12345").await;

    let response = app
        .request(
            "POST",
            &format!("/api/admin/reconcile-storage/{judy}"),
            None,
            Some(&root),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["previous_bytes"], 5);
    assert_eq!(response.data()["current_bytes"], 5);

    let missing = app
        .request(
            "POST",
            &format!("/api/admin/reconcile-storage/{}", Uuid::new_v4()),
            None,
            Some(&root),
        )
        .await;
    assert_eq!(missing.status, StatusCode::NOT_FOUND);

    let logs = app
        .request("GET", "/api/admin/security-logs", None, Some(&root))
        .await;
    assert_eq!(logs.status, StatusCode::OK);
    let kinds: Vec<&str> = logs
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["event_type"].as_str().unwrap())
        .collect();
    for kind in ["user_registered", "user_login", "file_uploaded"] {
        assert!(kinds.contains(&kind), "{kind} missing from {kinds:?}");
    }

    let limited = app
        .request("GET", "/api/admin/security-logs?limit=1", None, Some(&root))
        .await;
    assert_eq!(limited.data().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_extension_blocklist_management() {
    let app = TestApp::new().await;
    let root = app.root_token().await;
    let (_, token) = app.create_user("mallory").await;

    let current = app
        .request(
            "GET",
            "/api/admin/features/extension-blocklist",
            None,
            Some(&root),
        )
        .await;
    assert_eq!(current.status, StatusCode::OK);
    assert_eq!(current.data()["enabled"], true);

    let updated = app
        .request(
            "PUT",
            "/api/admin/features/extension-blocklist",
            Some(serde_json::json!({ "enabled": true, "extensions": ["TXT", ".md"] })),
            Some(&root),
        )
        .await;
    assert_eq!(updated.status, StatusCode::OK);
    assert_eq!(updated.data()["extensions"], serde_json::json!([".md", ".txt"]));

    let blocked = app.upload(&token, "notes.txt", None, b"x").await;
    assert_eq!(blocked.status, StatusCode::BAD_REQUEST);
    let allowed = app.upload(&token, "tool.exe", None, b"x").await;
    assert_eq!(allowed.status, StatusCode::OK);

    app.request(
        "PUT",
        "/api/admin/features/extension-blocklist",
        Some(serde_json::json!({ "enabled": false, "extensions": ["txt"] })),
        Some(&root),
    )
    .await;
    let unblocked = app.upload(&token, "notes.txt", None, b"x").await;
    assert_eq!(unblocked.status, StatusCode::OK);
}
