//! Storage abstraction traits
//!
//! This module defines the capability the stream writer uses to materialise an upload
//! on durable storage.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage operation errors
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("mkdir failed for {}: {source}", .path.display())]
    CreateDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("create failed for {}: {source}", .path.display())]
    CreateFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("write failed for {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("close failed for {}: {source}", .path.display())]
    Close {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Directory and file creation.
///
/// Implementations must be shareable across uploads; every handle they return is owned
/// by exactly one writer.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Create `path` and any missing parents
    async fn mkdir_all(&self, path: &Path) -> StorageResult<()>;

    /// Create (or truncate) the file at `path` and open it for writing
    async fn create(&self, path: &Path) -> StorageResult<Box<dyn FileHandle>>;
}

/// An open, writable file.
///
/// `close` must be safe to call more than once; dropping a handle without closing it
/// still releases the underlying resource.
#[async_trait]
pub trait FileHandle: Send {
    /// Append `data` to the file
    async fn write(&mut self, data: &[u8]) -> StorageResult<()>;

    /// Flush and release the file
    async fn close(&mut self) -> StorageResult<()>;
}
