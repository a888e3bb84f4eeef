use crate::traits::{FileHandle, FileStore, StorageError, StorageResult};
use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;
use tokio::io::AsyncWriteExt;

/// Local filesystem storage implementation
#[derive(Clone, Debug, Default)]
pub struct LocalFileStore;

impl LocalFileStore {
    pub fn new() -> Self {
        LocalFileStore
    }
}

#[async_trait]
impl FileStore for LocalFileStore {
    async fn mkdir_all(&self, path: &Path) -> StorageResult<()> {
        let mut builder = fs::DirBuilder::new();
        builder.recursive(true);
        #[cfg(unix)]
        builder.mode(0o755);

        builder
            .create(path)
            .await
            .map_err(|source| StorageError::CreateDirectory {
                path: path.to_path_buf(),
                source,
            })
    }

    async fn create(&self, path: &Path) -> StorageResult<Box<dyn FileHandle>> {
        let file = fs::File::create(path)
            .await
            .map_err(|source| StorageError::CreateFile {
                path: path.to_path_buf(),
                source,
            })?;

        tracing::debug!(path = %path.display(), "Local storage file created");

        Ok(Box::new(LocalFileHandle {
            file: Some(file),
            path: path.to_path_buf(),
            bytes_written: 0,
            opened_at: Instant::now(),
        }))
    }
}

/// Open file on the local filesystem
#[derive(Debug)]
pub struct LocalFileHandle {
    file: Option<fs::File>,
    path: PathBuf,
    bytes_written: u64,
    opened_at: Instant,
}

impl LocalFileHandle {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }
}

#[async_trait]
impl FileHandle for LocalFileHandle {
    async fn write(&mut self, data: &[u8]) -> StorageResult<()> {
        let file = self.file.as_mut().ok_or_else(|| StorageError::Write {
            path: self.path.clone(),
            source: io::Error::new(io::ErrorKind::Other, "file already closed"),
        })?;

        file.write_all(data)
            .await
            .map_err(|source| StorageError::Write {
                path: self.path.clone(),
                source,
            })?;

        self.bytes_written += data.len() as u64;
        Ok(())
    }

    async fn close(&mut self) -> StorageResult<()> {
        let Some(mut file) = self.file.take() else {
            return Ok(());
        };

        let close_err = |source| StorageError::Close {
            path: self.path.clone(),
            source,
        };
        file.flush().await.map_err(close_err)?;
        file.sync_all().await.map_err(close_err)?;

        tracing::info!(
            path = %self.path.display(),
            size_bytes = self.bytes_written,
            duration_ms = self.opened_at.elapsed().as_secs_f64() * 1000.0,
            "Local storage file closed"
        );

        Ok(())
    }
}
