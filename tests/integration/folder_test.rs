//! Integration tests for the folder hierarchy endpoints.

mod helpers;

use axum::http::StatusCode;
use helpers::TestApp;
use serde_json::Value;
use uuid::Uuid;

fn node<'a>(tree: &'a Value, id: Uuid) -> &'a Value {
    tree.as_array()
        .and_then(|nodes| nodes.iter().find(|n| n["id"] == id.to_string()))
        .unwrap_or_else(|| panic!("Folder {id} missing from tree: {tree:?}"))
}

#[tokio::test]
async fn test_create_nested_folders_and_breadcrumb() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("alice").await;

    let docs = app.create_folder(&token, "Docs", None).await;
    let work = app.create_folder(&token, "Work", Some(docs)).await;
    let q3 = app.create_folder(&token, "Q3", Some(work)).await;

    let response = app
        .request(
            "GET",
            &format!("/api/folders/breadcrumb/{q3}"),
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let names: Vec<&str> = response
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["Docs", "Work", "Q3"]);
}

#[tokio::test]
async fn test_sibling_names_are_unique() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("bob").await;
    let parent = app.create_folder(&token, "Photos", None).await;
    app.create_folder(&token, "2024", Some(parent)).await;

    let response = app
        .request(
            "POST",
            "/api/folders/create",
            Some(serde_json::json!({ "name": "2024", "parent_id": parent })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "CONFLICT");

    // Same name under a different parent is fine.
    app.create_folder(&token, "2024", None).await;
}

#[tokio::test]
async fn test_move_into_own_subtree_is_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("carol").await;
    let a = app.create_folder(&token, "A", None).await;
    let b = app.create_folder(&token, "B", Some(a)).await;
    let c = app.create_folder(&token, "C", Some(b)).await;

    for target in [a, c] {
        let response = app
            .request(
                "POST",
                "/api/folders/move",
                Some(serde_json::json!({ "folder_id": a, "target_parent_id": target })),
                Some(&token),
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.error_code(), "INVALID_OPERATION");
    }

    // Moving the leaf to the root works and the breadcrumb follows.
    let response = app
        .request(
            "POST",
            "/api/folders/move",
            Some(serde_json::json!({ "folder_id": c, "target_parent_id": null })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.data()["parent_id"], Value::Null);

    let crumbs = app
        .request(
            "GET",
            &format!("/api/folders/breadcrumb/{c}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(crumbs.data().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_requires_empty_folder() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("dave").await;
    let parent = app.create_folder(&token, "Parent", None).await;
    let child = app.create_folder(&token, "Child", Some(parent)).await;

    let response = app
        .request(
            "DELETE",
            &format!("/api/folders/delete/{parent}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "NOT_EMPTY");

    let file = app.upload_ok(&token, "notes.txt", Some(child), b"hello").await;
    let response = app
        .request(
            "DELETE",
            &format!("/api/folders/delete/{child}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.error_code(), "NOT_EMPTY");

    app.request(
        "DELETE",
        &format!("/api/files/delete/{file}"),
        None,
        Some(&token),
    )
    .await;
    for folder in [child, parent] {
        let response = app
            .request(
                "DELETE",
                &format!("/api/folders/delete/{folder}"),
                None,
                Some(&token),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    }

    let again = app
        .request(
            "DELETE",
            &format!("/api/folders/delete/{parent}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_tree_sizes_roll_up() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("erin").await;
    let top = app.create_folder(&token, "Top", None).await;
    let inner = app.create_folder(&token, "Inner", Some(top)).await;
    app.upload_ok(&token, "a.txt", Some(top), b"12345").await;
    app.upload_ok(&token, "b.txt", Some(inner), b"1234567").await;
    app.upload_ok(&token, "root.txt", None, b"123").await;

    let tree = app
        .request("GET", "/api/folders/tree", None, Some(&token))
        .await;
    assert_eq!(tree.status, StatusCode::OK);
    assert_eq!(node(tree.data(), top)["size_bytes"], 12);
    assert_eq!(node(tree.data(), inner)["size_bytes"], 7);

    let size = app
        .request(
            "GET",
            &format!("/api/folders/size/{top}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(size.status, StatusCode::OK);
    assert_eq!(size.data()["size"], 12);
}

#[tokio::test]
async fn test_folders_are_private_to_their_owner() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("frank").await;
    let (_, other) = app.create_user("grace").await;
    let private = app.create_folder(&owner, "Private", None).await;

    let breadcrumb = app
        .request(
            "GET",
            &format!("/api/folders/breadcrumb/{private}"),
            None,
            Some(&other),
        )
        .await;
    assert_eq!(breadcrumb.status, StatusCode::NOT_FOUND);

    let nested = app
        .request(
            "POST",
            "/api/folders/create",
            Some(serde_json::json!({ "name": "Sneaky", "parent_id": private })),
            Some(&other),
        )
        .await;
    assert_eq!(nested.status, StatusCode::NOT_FOUND);

    let delete = app
        .request(
            "DELETE",
            &format!("/api/folders/delete/{private}"),
            None,
            Some(&other),
        )
        .await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    let tree = app
        .request("GET", "/api/folders/tree", None, Some(&other))
        .await;
    assert_eq!(tree.data().as_array().unwrap().len(), 0);
}
