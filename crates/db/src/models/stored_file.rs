//! Stored file model: uploaded attachment bytes kept in the database,
//! keyed by an opaque UUID and streamed back verbatim on download.

use sqlx::FromRow;
use uuid::Uuid;

use lapor_core::types::Timestamp;

/// A row from the `stored_files` table, including the file bytes.
#[derive(Debug, Clone, FromRow)]
pub struct StoredFile {
    pub id: Uuid,
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
    pub created_at: Timestamp,
}

/// DTO for persisting a newly uploaded file.
#[derive(Debug)]
pub struct NewStoredFile {
    pub filename: String,
    pub content_type: String,
    pub data: Vec<u8>,
}
