//! Request handlers, grouped by resource.

pub mod attachments;
pub mod reports;
pub mod users;
