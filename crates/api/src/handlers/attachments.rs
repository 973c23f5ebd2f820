//! Handlers for report attachments stored in the database, and the public
//! file download endpoint.

use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use uuid::Uuid;

use lapor_core::error::CoreError;
use lapor_core::types::DbId;
use lapor_db::models::report::AttachmentRecord;
use lapor_db::models::stored_file::NewStoredFile;
use lapor_db::repositories::{ReportRepo, StoredFileRepo};

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::state::AppState;

/// Content type recorded when the client does not provide one.
const FALLBACK_CONTENT_TYPE: &str = "application/octet-stream";

/// POST /api/reports/{id}/attachments
///
/// Accepts a single multipart file field, stores the bytes in
/// `stored_files`, and links them to the report in one transaction.
pub async fn upload_attachment(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<DbId>,
    mut multipart: Multipart,
) -> AppResult<(StatusCode, Json<AttachmentRecord>)> {
    let mut file: Option<NewStoredFile> = None;

    while let Some(field) = multipart.next_field().await? {
        // Take the first field that carries a filename, whatever it is named.
        if field.file_name().is_none() {
            continue;
        }
        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field
            .content_type()
            .unwrap_or(FALLBACK_CONTENT_TYPE)
            .to_string();
        let data = field.bytes().await?.to_vec();

        file = Some(NewStoredFile {
            filename,
            content_type,
            data,
        });
        break;
    }

    let file = file.ok_or_else(|| AppError::BadRequest("No file provided".into()))?;
    if file.data.is_empty() {
        return Err(AppError::BadRequest("Uploaded file is empty".into()));
    }

    let record = ReportRepo::attach_file(&state.pool, id, &file)
        .await?
        .ok_or(AppError::Core(CoreError::NotFound {
            entity: "Report",
            id,
        }))?;

    tracing::info!(
        report_id = id,
        user_id = user.user_id,
        file_id = %record.file_id,
        "Attachment uploaded"
    );

    Ok((StatusCode::CREATED, Json(record)))
}

/// GET /api/files/{id}
///
/// Stream stored file bytes back with the content type recorded at upload.
pub async fn download_file(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> AppResult<Response> {
    let file = StoredFileRepo::find_by_id(&state.pool, id)
        .await?
        .ok_or(AppError::Database(sqlx::Error::RowNotFound))?;

    let disposition = format!("inline; filename=\"{}\"", file.filename.replace('"', ""));

    Ok((
        [
            (CONTENT_TYPE, file.content_type),
            (CONTENT_DISPOSITION, disposition),
        ],
        file.data,
    )
        .into_response())
}
