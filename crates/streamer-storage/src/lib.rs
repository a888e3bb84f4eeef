//! Streamer Storage Library
//!
//! This crate provides the storage capability the stream writer drives: create a
//! directory, create a file, write to it and close it. Keeping these behind the
//! [`FileStore`] and [`FileHandle`] traits lets the writer run against fakes in tests.
//!
//! # Artifact layout
//!
//! Every upload owns one directory and one file, both named after the upload id:
//!
//! - `{upload_root}/{id}/{id}`
//!
//! The mapping id → artifact is therefore derivable without an index. Path generation
//! is centralized in the `keys` module.

pub mod keys;
pub mod local;
pub mod traits;

// Re-export commonly used types
pub use keys::{upload_dir, upload_path};
pub use local::{LocalFileHandle, LocalFileStore};
pub use traits::{FileHandle, FileStore, StorageError, StorageResult};
