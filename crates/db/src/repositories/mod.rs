//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument.

pub mod report_repo;
pub mod stored_file_repo;
pub mod user_repo;

pub use report_repo::ReportRepo;
pub use stored_file_repo::StoredFileRepo;
pub use user_repo::UserRepo;
