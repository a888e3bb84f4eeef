//! Streamer database layer
//!
//! Repository trait and implementations for the file metadata records.

pub mod db;

pub use db::connection::connect;
#[cfg(any(test, feature = "test-util"))]
pub use db::memory::InMemoryFileRecordRepository;
pub use db::{FileRecordRepository, PgFileRecordRepository};
