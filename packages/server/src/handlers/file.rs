use axum::body::Body;
use axum::extract::{DefaultBodyLimit, Multipart, Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use common::FileCategory;
use common::storage::ContentHash;
use sea_orm::sea_query::Query as DbQuery;
use sea_orm::*;
use serde::Deserialize;
use tokio_util::io::ReaderStream;
use tracing::instrument;

use crate::entity::{project, project_file};
use crate::error::{AppError, ErrorBody};
use crate::extractors::auth::AuthUser;
use crate::handlers::project::touch_project;
use crate::models::file::FilePayload;
use crate::policy;
use crate::state::AppState;

pub fn upload_body_limit() -> DefaultBodyLimit {
    // Slightly above the configured per-file cap to leave room for the
    // other multipart fields.
    DefaultBodyLimit::max(52 * 1024 * 1024)
}

/// Query string for the file list.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct FileListQuery {
    /// Restrict to one project.
    pub project: Option<i32>,
}

#[utoipa::path(
    get,
    path = "/",
    tag = "Files",
    operation_id = "listFiles",
    summary = "List visible files",
    description = "Metadata only, newest first. Clients see files on their own \
        projects; confidential files are staff-only.",
    params(FileListQuery),
    responses(
        (status = 200, description = "File list", body = [FilePayload]),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user, query), fields(user_id = auth_user.user_id))]
pub async fn list_files(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Query(query): Query<FileListQuery>,
) -> Result<Json<Vec<FilePayload>>, AppError> {
    let mut find = project_file::Entity::find();

    match query.project {
        Some(project_id) => {
            policy::find_project(&state.db, &auth_user, project_id).await?;
            find = find.filter(project_file::Column::ProjectId.eq(project_id));
        }
        None if !auth_user.is_staff => {
            let owned = DbQuery::select()
                .column(project::Column::Id)
                .from(project::Entity)
                .and_where(project::Column::ClientId.eq(auth_user.user_id))
                .to_owned();
            find = find.filter(project_file::Column::ProjectId.in_subquery(owned));
        }
        None => {}
    }

    if !auth_user.is_staff {
        find = find.filter(project_file::Column::IsConfidential.eq(false));
    }

    let files = find
        .order_by_desc(project_file::Column::CreatedAt)
        .all(&state.db)
        .await?;

    Ok(Json(files.into_iter().map(FilePayload::from).collect()))
}

#[utoipa::path(
    post,
    path = "/",
    tag = "Files",
    operation_id = "uploadFile",
    summary = "Upload a file",
    description = "Multipart upload. Required fields: `file`, `project`. Optional: \
        `name` (defaults to the file name), `description`, `category`, \
        `is_confidential`. Content is stored by SHA-256, so identical uploads share \
        bytes on disk. Payloads over the configured cap are rejected.",
    request_body(content_type = "multipart/form-data", description = "File upload"),
    responses(
        (status = 201, description = "File stored", body = FilePayload),
        (status = 400, description = "Validation error (VALIDATION_ERROR)", body = ErrorBody),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "Project not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user, multipart), fields(user_id = auth_user.user_id))]
pub async fn upload_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, AppError> {
    let max_size = state.config.storage.max_file_size;

    let mut file_bytes: Option<Vec<u8>> = None;
    let mut file_name: Option<String> = None;
    let mut project_id: Option<i32> = None;
    let mut name: Option<String> = None;
    let mut description = String::new();
    let mut category = FileCategory::default();
    let mut is_confidential = false;

    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        match field.name() {
            Some("file") => {
                file_name = field.file_name().map(|s| s.to_string());

                let mut buf = Vec::new();
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| AppError::Validation(format!("Upload read error: {e}")))?
                {
                    if (buf.len() + chunk.len()) as u64 > max_size {
                        return Err(AppError::Validation(format!(
                            "File exceeds maximum size of {max_size} bytes"
                        )));
                    }
                    buf.extend_from_slice(&chunk);
                }
                file_bytes = Some(buf);
            }
            Some("project") => {
                let text = read_text_field(field, "project").await?;
                project_id = Some(text.trim().parse().map_err(|_| {
                    AppError::Validation("Field 'project' must be an integer".into())
                })?);
            }
            Some("name") => name = Some(read_text_field(field, "name").await?),
            Some("description") => description = read_text_field(field, "description").await?,
            Some("category") => {
                let text = read_text_field(field, "category").await?;
                category = serde_json::from_value(serde_json::Value::String(text.clone()))
                    .map_err(|_| {
                        AppError::Validation(format!("Unknown file category '{text}'"))
                    })?;
            }
            Some("is_confidential") => {
                let text = read_text_field(field, "is_confidential").await?;
                is_confidential = matches!(text.trim(), "true" | "1");
            }
            _ => {} // Ignore unknown fields.
        }
    }

    let bytes = file_bytes.ok_or_else(|| AppError::Validation("Missing 'file' field".into()))?;
    let project_id =
        project_id.ok_or_else(|| AppError::Validation("Missing 'project' field".into()))?;
    let file_name =
        file_name.ok_or_else(|| AppError::Validation("File field must have a filename".into()))?;

    policy::find_project(&state.db, &auth_user, project_id).await?;

    let size = i64::try_from(bytes.len()).unwrap_or(i64::MAX);
    let hash = state.blob_store.put(&bytes).await?;

    let now = Utc::now();
    let txn = state.db.begin().await?;

    let file = project_file::ActiveModel {
        project_id: Set(project_id),
        name: Set(name.filter(|n| !n.trim().is_empty()).unwrap_or_else(|| file_name.clone())),
        description: Set(description),
        category: Set(category),
        content_hash: Set(hash.to_hex()),
        file_name: Set(file_name),
        file_size: Set(Some(size)),
        is_confidential: Set(is_confidential),
        uploaded_by: Set(Some(auth_user.user_id)),
        created_at: Set(now),
        ..Default::default()
    }
    .insert(&txn)
    .await?;

    touch_project(&txn, project_id, now).await?;
    txn.commit().await?;

    Ok((StatusCode::CREATED, Json(FilePayload::from(file))))
}

#[utoipa::path(
    get,
    path = "/{id}/download",
    tag = "Files",
    operation_id = "downloadFile",
    summary = "Download a file",
    description = "Streams the stored content as an attachment under its original \
        file name. 404 when the metadata row exists but the content is gone.",
    params(("id" = i32, Path, description = "File ID")),
    responses(
        (status = 200, description = "File content"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user), fields(file_id = id))]
pub async fn download_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Response, AppError> {
    let file = find_file(&state.db, &auth_user, id).await?;

    let hash = ContentHash::from_hex(&file.content_hash)?;
    let reader = state.blob_store.get_stream(&hash).await?;
    let body = Body::from_stream(ReaderStream::new(reader));

    let content_type = mime_guess::from_path(&file.file_name)
        .first()
        .map(|m| m.to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string());

    let mut builder = Response::builder()
        .status(StatusCode::OK)
        .header(header::CONTENT_TYPE, content_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition_value(&file.file_name),
        );
    if let Some(size) = file.file_size {
        builder = builder.header(header::CONTENT_LENGTH, size.to_string());
    }

    builder
        .body(body)
        .map_err(|e| AppError::Internal(format!("Failed to build response: {e}")))
}

#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Files",
    operation_id = "deleteFile",
    summary = "Delete a file",
    description = "Staff only. The stored content is removed once no other record \
        references it.",
    params(("id" = i32, Path, description = "File ID")),
    responses(
        (status = 204, description = "File deleted"),
        (status = 401, description = "Unauthorized (TOKEN_MISSING, TOKEN_INVALID)", body = ErrorBody),
        (status = 403, description = "Forbidden (PERMISSION_DENIED)", body = ErrorBody),
        (status = 404, description = "File not found (NOT_FOUND)", body = ErrorBody),
    ),
    security(("token" = [])),
)]
#[instrument(skip(state, auth_user), fields(file_id = id))]
pub async fn delete_file(
    auth_user: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse, AppError> {
    auth_user.require_staff()?;

    let file = project_file::Entity::find_by_id(id)
        .one(&state.db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File {id} not found")))?;

    project_file::Entity::delete_by_id(id)
        .exec(&state.db)
        .await?;

    delete_blob_if_unreferenced(&state, &file.content_hash).await;

    Ok(StatusCode::NO_CONTENT)
}

/// Remove stored content when no metadata row references `hash` anymore.
/// Failures are logged; the row deletion already succeeded.
pub async fn delete_blob_if_unreferenced(state: &AppState, hash: &str) {
    let refs = project_file::Entity::find()
        .filter(project_file::Column::ContentHash.eq(hash))
        .count(&state.db)
        .await;

    match refs {
        Ok(0) => {
            let Ok(parsed) = ContentHash::from_hex(hash) else {
                tracing::warn!("Stored content hash is malformed: {hash}");
                return;
            };
            if let Err(e) = state.blob_store.delete(&parsed).await {
                tracing::warn!("Failed to delete blob {hash}: {e}");
            }
        }
        Ok(_) => {}
        Err(e) => tracing::warn!("Blob refcount query failed for {hash}: {e}"),
    }
}

async fn find_file(
    db: &DatabaseConnection,
    auth_user: &AuthUser,
    id: i32,
) -> Result<project_file::Model, AppError> {
    let file = project_file::Entity::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("File {id} not found")))?;

    policy::find_project(db, auth_user, file.project_id).await?;

    if file.is_confidential && !auth_user.is_staff {
        return Err(AppError::PermissionDenied);
    }

    Ok(file)
}

async fn read_text_field(
    field: axum::extract::multipart::Field<'_>,
    name: &str,
) -> Result<String, AppError> {
    field
        .text()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read '{name}': {e}")))
}

/// Build a safe `Content-Disposition` header value.
fn content_disposition_value(filename: &str) -> String {
    let ascii_safe: String = filename
        .chars()
        .filter(|c| c.is_ascii_graphic() && !matches!(c, '"' | ';' | '\\'))
        .collect();
    let ascii_name = if ascii_safe.is_empty() {
        "download".to_string()
    } else {
        ascii_safe
    };

    // RFC 5987 percent-encoding for filename*.
    let encoded: String = filename
        .bytes()
        .map(|b| match b {
            b'A'..=b'Z'
            | b'a'..=b'z'
            | b'0'..=b'9'
            | b'!'
            | b'#'
            | b'$'
            | b'&'
            | b'+'
            | b'-'
            | b'.'
            | b'^'
            | b'_'
            | b'`'
            | b'|'
            | b'~' => String::from(b as char),
            _ => format!("%{b:02X}"),
        })
        .collect();

    format!("attachment; filename=\"{ascii_name}\"; filename*=UTF-8''{encoded}")
}
