//! Shared test helpers for integration tests.
//!
//! Every `TestApp` runs the full router over the in-memory record store
//! and blob store, so no database is needed.

#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::{Body, Bytes};
use axum::http::{HeaderMap, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use minicloud_api::AppState;
use minicloud_core::config::AppConfig;
use minicloud_database::RecordStore;
use minicloud_storage::MemoryBlobStore;

/// Password satisfying the policy, used for every test account.
pub const PASSWORD: &str = "Passw0rd!";

/// Username of the bootstrap super-admin.
pub const ROOT: &str = "root";

const BOUNDARY: &str = "minicloud-test-boundary";

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Shared state, for direct inspection of the stores
    pub state: AppState,
    /// Blob store behind the router
    pub blobs: Arc<MemoryBlobStore>,
}

impl TestApp {
    /// Create a new test application
    pub async fn new() -> Self {
        Self::with_config(Self::config()).await
    }

    /// Configuration every test starts from.
    pub fn config() -> AppConfig {
        let mut config = AppConfig::default();
        config.auth.jwt_secret = "integration-secret".to_string();
        config.auth.bootstrap_admin_username = ROOT.to_string();
        config.auth.bootstrap_admin_email = "root@test.com".to_string();
        config.auth.bootstrap_admin_password = PASSWORD.to_string();
        config.storage.max_upload_size_bytes = 1024 * 1024;
        config
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let blobs = Arc::new(MemoryBlobStore::new());
        let state = AppState::build(config, RecordStore::memory(), blobs.clone());
        state.bootstrap().await.expect("Bootstrap failed");

        Self {
            router: minicloud_api::build_app(state.clone()),
            state,
            blobs,
        }
    }

    /// Register an account with the shared test password.
    pub async fn register(&self, username: &str) -> TestResponse {
        let body = serde_json::json!({
            "username": username,
            "email": format!("{username}@test.com"),
            "password": PASSWORD,
        });
        self.request("POST", "/api/auth/register", Some(body), None)
            .await
    }

    /// Register an account and return its ID and a token.
    pub async fn create_user(&self, username: &str) -> (Uuid, String) {
        let response = self.register(username).await;
        assert_eq!(
            response.status,
            StatusCode::OK,
            "Registration failed: {:?}",
            response.body
        );
        let token = self.login(username, PASSWORD).await;
        (response.id(), token)
    }

    /// Token of the bootstrap super-admin.
    pub async fn root_token(&self) -> String {
        self.login(ROOT, PASSWORD).await
    }

    /// Register an account, promote it to admin, and return its ID and a token.
    pub async fn create_admin(&self, username: &str) -> (Uuid, String) {
        let (id, token) = self.create_user(username).await;
        let root = self.root_token().await;
        let response = self
            .request(
                "POST",
                "/api/admin/change-role",
                Some(serde_json::json!({ "user_id": id, "role": "admin" })),
                Some(&root),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        (id, token)
    }

    /// Login and return the bearer token
    pub async fn login(&self, username: &str, password: &str) -> String {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });

        let response = self
            .request("POST", "/api/auth/login", Some(body), None)
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.data()["token"]
            .as_str()
            .expect("No token in login response")
            .to_string()
    }

    /// Create a folder and return its ID.
    pub async fn create_folder(&self, token: &str, name: &str, parent_id: Option<Uuid>) -> Uuid {
        let response = self
            .request(
                "POST",
                "/api/folders/create",
                Some(serde_json::json!({ "name": name, "parent_id": parent_id })),
                Some(token),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.id()
    }

    /// Make a JSON request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");

        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let raw = self.send(req).await;
        TestResponse::from_raw(raw)
    }

    /// Upload `content` as a multipart `file` field.
    pub async fn upload(
        &self,
        token: &str,
        file_name: &str,
        folder_id: Option<Uuid>,
        content: &[u8],
    ) -> TestResponse {
        let mut body = Vec::new();
        if let Some(folder_id) = folder_id {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"folder_id\"\r\n\r\n{folder_id}\r\n"
                )
                .as_bytes(),
            );
        }
        body.extend_from_slice(
            format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\nContent-Type: application/octet-stream\r\n\r\n"
            )
            .as_bytes(),
        );
        body.extend_from_slice(content);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

        let req = Request::builder()
            .method("POST")
            .uri("/api/files/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::from(body))
            .expect("Failed to build request");

        TestResponse::from_raw(self.send(req).await)
    }

    /// Upload and return the new file's ID.
    pub async fn upload_ok(
        &self,
        token: &str,
        file_name: &str,
        folder_id: Option<Uuid>,
        content: &[u8],
    ) -> Uuid {
        let response = self.upload(token, file_name, folder_id, content).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
        response.id()
    }

    /// Download a file, keeping the raw body and headers.
    pub async fn download(&self, token: &str, file_id: Uuid) -> RawResponse {
        let req = Request::builder()
            .method("GET")
            .uri(format!("/api/files/download/{file_id}"))
            .header(header::AUTHORIZATION, format!("Bearer {token}"))
            .body(Body::empty())
            .expect("Failed to build request");
        self.send(req).await
    }

    async fn send(&self, req: Request<Body>) -> RawResponse {
        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .expect("Failed to read body")
            .to_bytes();

        RawResponse {
            status,
            headers,
            body,
        }
    }
}

/// Unparsed response
#[derive(Debug)]
pub struct RawResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    fn from_raw(raw: RawResponse) -> Self {
        let body: Value = serde_json::from_slice(&raw.body).unwrap_or(Value::Null);
        Self {
            status: raw.status,
            body,
        }
    }

    /// The `data` member of a success envelope.
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    /// `data.id` parsed as a UUID.
    pub fn id(&self) -> Uuid {
        self.data()["id"]
            .as_str()
            .and_then(|s| s.parse().ok())
            .unwrap_or_else(|| panic!("No id in response: {:?}", self.body))
    }

    /// The `error` code of a failure body.
    pub fn error_code(&self) -> &str {
        self.body["error"].as_str().unwrap_or_default()
    }
}
