//! Entity models and DTOs, one module per aggregate.

pub mod report;
pub mod stored_file;
pub mod user;
