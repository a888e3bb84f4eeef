//! Database repositories for data access layer
//!
//! Each upload produces exactly one `file_details` row. Repositories are storage-agnostic
//! behind [`FileRecordRepository`] so the registrar can run against any backend.

pub mod connection;
pub mod file_record;
#[cfg(any(test, feature = "test-util"))]
pub mod memory;

pub use file_record::{FileRecordRepository, PgFileRecordRepository};
