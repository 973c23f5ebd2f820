//! Domain types and pure logic for the campus complaint-tracking service.
//!
//! This crate has no I/O: it defines the error taxonomy, role and report
//! status vocabularies, the status-change planner shared by every
//! status-mutating endpoint, and small pure helpers (summary bucketing,
//! weekly-stats windowing, pagination clamping) that the API and
//! repository layers build on.

pub mod error;
pub mod pagination;
pub mod report;
pub mod roles;
pub mod types;
