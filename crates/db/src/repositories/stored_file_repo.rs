//! Repository for the `stored_files` table.
//!
//! Inserts happen inside [`ReportRepo::attach_file`]; this repository only
//! serves downloads.
//!
//! [`ReportRepo::attach_file`]: crate::repositories::ReportRepo::attach_file

use sqlx::PgPool;
use uuid::Uuid;

use crate::models::stored_file::StoredFile;

/// Read access to stored file bytes.
pub struct StoredFileRepo;

impl StoredFileRepo {
    /// Fetch a stored file, bytes included, by its UUID.
    pub async fn find_by_id(pool: &PgPool, id: Uuid) -> Result<Option<StoredFile>, sqlx::Error> {
        sqlx::query_as::<_, StoredFile>(
            "SELECT id, filename, content_type, data, created_at \
             FROM stored_files WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }
}
