//! File upload, download, listing, move and delete handlers.

use axum::Json;
use axum::body::Body;
use axum::extract::multipart::MultipartError;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::Response;
use bytes::Bytes;
use futures::stream;
use uuid::Uuid;

use minicloud_core::error::AppError;
use minicloud_service::file::{DownloadResult, UploadRequest};

use crate::dto::request::{ListFilesQuery, MoveFileRequest};
use crate::dto::response::{ApiResponse, FileResponse, MessageResponse};
use crate::extractors::{AuthUser, ValidatedJson};
use crate::state::AppState;

/// POST /api/files/upload (multipart: `file`, optional `folder_id`)
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> Result<Json<ApiResponse<FileResponse>>, AppError> {
    let mut upload: Option<(String, Vec<Bytes>)> = None;
    let mut folder_id: Option<Uuid> = None;

    while let Some(mut field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().map(str::to_owned);
        match name.as_deref() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let mut chunks = Vec::new();
                while let Some(chunk) = field.chunk().await.map_err(multipart_error)? {
                    chunks.push(chunk);
                }
                upload = Some((file_name, chunks));
            }
            Some("folder_id") => {
                let value = field.text().await.map_err(multipart_error)?;
                folder_id = parse_folder_id(&value)?;
            }
            _ => {}
        }
    }

    let (file_name, chunks) =
        upload.ok_or_else(|| AppError::invalid_input("Multipart field 'file' is required"))?;

    let content = stream::iter(chunks.into_iter().map(Ok::<_, std::io::Error>));
    let file = state
        .upload_service
        .upload(
            &auth,
            UploadRequest {
                file_name,
                folder_id,
                content: Box::pin(content),
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(file.into())))
}

/// GET /api/files/download/{id}
pub async fn download_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Response, AppError> {
    let DownloadResult { file, content } = state.download_service.download(&auth, id).await?;

    Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, file.content_type)
        .header(header::CONTENT_DISPOSITION, content_disposition(&file.name))
        .body(Body::from_stream(content))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))
}

/// DELETE /api/files/delete/{id}
pub async fn delete_file(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<MessageResponse>>, AppError> {
    state.file_service.delete_file(&auth, id).await?;
    Ok(Json(ApiResponse::ok(MessageResponse::new(
        "File deleted successfully",
    ))))
}

/// POST /api/files/move
pub async fn move_file(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(req): ValidatedJson<MoveFileRequest>,
) -> Result<Json<ApiResponse<FileResponse>>, AppError> {
    let file = state
        .file_service
        .move_file(&auth, req.file_id, req.target_folder_id)
        .await?;
    Ok(Json(ApiResponse::ok(file.into())))
}

/// GET /api/files/list?folder_id=...
pub async fn list_files(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<ListFilesQuery>,
) -> Result<Json<ApiResponse<Vec<FileResponse>>>, AppError> {
    let files = state.file_service.list_files(&auth, query.folder_id).await?;
    Ok(Json(ApiResponse::ok(
        files.into_iter().map(FileResponse::from).collect(),
    )))
}

fn multipart_error(e: MultipartError) -> AppError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::invalid_input("File exceeds the maximum upload size")
    } else {
        AppError::invalid_input(format!("Invalid multipart body: {}", e.body_text()))
    }
}

/// Empty means the root folder.
fn parse_folder_id(value: &str) -> Result<Option<Uuid>, AppError> {
    let value = value.trim();
    if value.is_empty() || value == "null" {
        return Ok(None);
    }
    Uuid::parse_str(value)
        .map(Some)
        .map_err(|_| AppError::invalid_input("Invalid folder_id"))
}

/// `attachment` disposition with an ASCII fallback name and the exact
/// UTF-8 name in `filename*`.
fn content_disposition(name: &str) -> String {
    let fallback: String = name
        .chars()
        .map(|c| {
            if (c.is_ascii_graphic() && c != '"' && c != '\\') || c == ' ' {
                c
            } else {
                '_'
            }
        })
        .collect();

    let encoded = urlencoding::encode(name);
    format!("attachment; filename=\"{fallback}\"; filename*=UTF-8''{encoded}")
}
