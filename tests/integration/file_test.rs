//! Integration tests for upload, download, listing, move and delete.

mod helpers;

use axum::body::Bytes;
use axum::http::{StatusCode, header};
use helpers::TestApp;
use minicloud_core::traits::storage::BlobStore;
use uuid::Uuid;

#[tokio::test]
async fn test_upload_and_download_round_trip() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("alice").await;

    let response = app.upload(&token, "hello.txt", None, b"hello world").await;
    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.data()["name"], "hello.txt");
    assert_eq!(response.data()["size"], 11);
    assert_eq!(response.data()["mime_type"], "text/plain");
    let file_id = response.id();

    let download = app.download(&token, file_id).await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(&download.body[..], b"hello world");
    assert_eq!(download.headers[header::CONTENT_TYPE], "text/plain");
    let disposition = download.headers[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap();
    assert!(disposition.starts_with("attachment;"));
    assert!(disposition.contains("hello.txt"));
}

#[tokio::test]
async fn test_download_streams_actual_blob_length() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("olivia").await;
    let file_id = app.upload_ok(&token, "notes.txt", None, b"short").await;

    // The blob drifts away from the recorded size.
    let file = app
        .state
        .store
        .files
        .find_by_id(file_id)
        .await
        .unwrap()
        .unwrap();
    let longer: &'static [u8] = b"considerably longer content";
    app.blobs
        .write(
            file.owner_id,
            file.blob_id,
            Box::pin(futures::stream::iter([Ok::<_, std::io::Error>(
                Bytes::from_static(longer),
            )])),
            1024,
        )
        .await
        .unwrap();

    let download = app.download(&token, file_id).await;
    assert_eq!(download.status, StatusCode::OK);
    assert_eq!(&download.body[..], longer);
    assert!(download.headers.get(header::CONTENT_LENGTH).is_none());
}

#[tokio::test]
async fn test_list_files_by_folder() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("bob").await;
    let folder = app.create_folder(&token, "Docs", None).await;
    app.upload_ok(&token, "root.bin", None, b"1").await;
    app.upload_ok(&token, "inside.pdf", Some(folder), b"22").await;

    let root = app
        .request("GET", "/api/files/list", None, Some(&token))
        .await;
    assert_eq!(root.status, StatusCode::OK);
    let names: Vec<&str> = root
        .data()
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, ["root.bin"]);

    let inside = app
        .request(
            "GET",
            &format!("/api/files/list?folder_id={folder}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(inside.data()[0]["name"], "inside.pdf");
    assert_eq!(inside.data()[0]["folder_id"], folder.to_string());
}

#[tokio::test]
async fn test_blocked_extension_is_rejected() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("carol").await;

    let response = app.upload(&token, "setup.EXE", None, b"MZ").await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(
        response.body["message"],
        "File type not allowed for security reasons"
    );
    assert!(app.blobs.is_empty());
}

#[tokio::test]
async fn test_oversized_upload_is_rejected() {
    let mut config = TestApp::config();
    config.storage.max_upload_size_bytes = 8;
    let app = TestApp::with_config(config).await;
    let (_, token) = app.create_user("dave").await;

    let response = app
        .upload(&token, "big.bin", None, b"0123456789abcdef")
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), "INVALID_INPUT");
    assert!(app.blobs.is_empty());

    let stats = app
        .request("GET", "/api/user/stats", None, Some(&token))
        .await;
    assert_eq!(stats.data()["storage_used"], 0);
}

#[tokio::test]
async fn test_upload_into_foreign_folder_is_not_found() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("erin").await;
    let (_, other) = app.create_user("frank").await;
    let folder = app.create_folder(&owner, "Mine", None).await;

    let response = app.upload(&other, "x.txt", Some(folder), b"x").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    let unknown = app.upload(&other, "x.txt", Some(Uuid::new_v4()), b"x").await;
    assert_eq!(unknown.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_files_are_private_to_their_owner() {
    let app = TestApp::new().await;
    let (_, owner) = app.create_user("grace").await;
    let (_, other) = app.create_user("heidi").await;
    let file = app.upload_ok(&owner, "secret.txt", None, b"s3cr3t").await;

    let download = app.download(&other, file).await;
    assert_eq!(download.status, StatusCode::NOT_FOUND);

    let delete = app
        .request(
            "DELETE",
            &format!("/api/files/delete/{file}"),
            None,
            Some(&other),
        )
        .await;
    assert_eq!(delete.status, StatusCode::NOT_FOUND);

    let listing = app
        .request("GET", "/api/files/list", None, Some(&other))
        .await;
    assert_eq!(listing.data().as_array().unwrap().len(), 0);
}

#[tokio::test]
async fn test_move_file() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("ivan").await;
    let (_, other) = app.create_user("judy").await;
    let folder = app.create_folder(&token, "Archive", None).await;
    let foreign = app.create_folder(&other, "Theirs", None).await;
    let file = app.upload_ok(&token, "a.txt", None, b"abc").await;

    let moved = app
        .request(
            "POST",
            "/api/files/move",
            Some(serde_json::json!({ "file_id": file, "target_folder_id": folder })),
            Some(&token),
        )
        .await;
    assert_eq!(moved.status, StatusCode::OK);
    assert_eq!(moved.data()["folder_id"], folder.to_string());

    let rejected = app
        .request(
            "POST",
            "/api/files/move",
            Some(serde_json::json!({ "file_id": file, "target_folder_id": foreign })),
            Some(&token),
        )
        .await;
    assert_eq!(rejected.status, StatusCode::NOT_FOUND);

    let back = app
        .request(
            "POST",
            "/api/files/move",
            Some(serde_json::json!({ "file_id": file })),
            Some(&token),
        )
        .await;
    assert_eq!(back.status, StatusCode::OK);
    assert!(back.data()["folder_id"].is_null());
}

#[tokio::test]
async fn test_delete_debits_usage() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("mallory").await;
    let keep = app.upload_ok(&token, "keep.txt", None, b"12345").await;
    let gone = app.upload_ok(&token, "gone.txt", None, b"123").await;

    let stats = app
        .request("GET", "/api/user/stats", None, Some(&token))
        .await;
    assert_eq!(stats.data()["storage_used"], 8);
    assert_eq!(stats.data()["file_count"], 2);

    let deleted = app
        .request(
            "DELETE",
            &format!("/api/files/delete/{gone}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(deleted.status, StatusCode::OK);

    let stats = app
        .request("GET", "/api/user/stats", None, Some(&token))
        .await;
    assert_eq!(stats.data()["storage_used"], 5);
    assert_eq!(stats.data()["file_count"], 1);

    let again = app
        .request(
            "DELETE",
            &format!("/api/files/delete/{gone}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(again.status, StatusCode::NOT_FOUND);

    let download = app.download(&token, keep).await;
    assert_eq!(&download.body[..], b"12345");
}

#[tokio::test]
async fn test_upload_requires_file_field() {
    let app = TestApp::new().await;
    let (_, token) = app.create_user("niaj").await;

    let response = app
        .request("POST", "/api/files/upload", None, Some(&token))
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
