//! Instrumented file store for pipeline tests.

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use streamer_storage::{FileHandle, FileStore, StorageError, StorageResult};

/// Which storage call should fail.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FailAt {
    Nothing,
    Mkdir,
    Create,
    Write,
}

#[derive(Default)]
struct Counters {
    mkdirs: AtomicUsize,
    creates: AtomicUsize,
    writes: AtomicUsize,
    open_handles: AtomicUsize,
    closes: AtomicUsize,
}

/// In-memory store that records every call and keeps written bytes per path.
#[derive(Clone)]
pub struct RecordingStore {
    fail_at: FailAt,
    counters: Arc<Counters>,
    files: Arc<Mutex<Vec<(PathBuf, Arc<Mutex<Vec<u8>>>)>>>,
}

impl RecordingStore {
    pub fn new() -> Self {
        Self::failing_at(FailAt::Nothing)
    }

    pub fn failing_at(fail_at: FailAt) -> Self {
        Self {
            fail_at,
            counters: Arc::default(),
            files: Arc::default(),
        }
    }

    pub fn mkdirs(&self) -> usize {
        self.counters.mkdirs.load(Ordering::SeqCst)
    }

    pub fn creates(&self) -> usize {
        self.counters.creates.load(Ordering::SeqCst)
    }

    pub fn writes(&self) -> usize {
        self.counters.writes.load(Ordering::SeqCst)
    }

    pub fn closes(&self) -> usize {
        self.counters.closes.load(Ordering::SeqCst)
    }

    /// Handles created and not yet closed
    pub fn open_handles(&self) -> usize {
        self.counters.open_handles.load(Ordering::SeqCst)
    }

    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        let files = self.files.lock().unwrap();
        files
            .iter()
            .find(|(p, _)| p == path)
            .map(|(_, data)| data.lock().unwrap().clone())
    }
}

fn injected(kind: &str) -> io::Error {
    io::Error::new(io::ErrorKind::PermissionDenied, format!("injected {} failure", kind))
}

#[async_trait]
impl FileStore for RecordingStore {
    async fn mkdir_all(&self, path: &Path) -> StorageResult<()> {
        self.counters.mkdirs.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == FailAt::Mkdir {
            return Err(StorageError::CreateDirectory {
                path: path.to_path_buf(),
                source: injected("mkdir"),
            });
        }
        Ok(())
    }

    async fn create(&self, path: &Path) -> StorageResult<Box<dyn FileHandle>> {
        self.counters.creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_at == FailAt::Create {
            return Err(StorageError::CreateFile {
                path: path.to_path_buf(),
                source: injected("create"),
            });
        }

        let data = Arc::new(Mutex::new(Vec::new()));
        self.files
            .lock()
            .unwrap()
            .push((path.to_path_buf(), data.clone()));
        self.counters.open_handles.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(RecordingHandle {
            path: path.to_path_buf(),
            data,
            fail_writes: self.fail_at == FailAt::Write,
            counters: self.counters.clone(),
            closed: false,
        }))
    }
}

struct RecordingHandle {
    path: PathBuf,
    data: Arc<Mutex<Vec<u8>>>,
    fail_writes: bool,
    counters: Arc<Counters>,
    closed: bool,
}

#[async_trait]
impl FileHandle for RecordingHandle {
    async fn write(&mut self, data: &[u8]) -> StorageResult<()> {
        if self.fail_writes {
            return Err(StorageError::Write {
                path: self.path.clone(),
                source: injected("write"),
            });
        }
        self.counters.writes.fetch_add(1, Ordering::SeqCst);
        self.data.lock().unwrap().extend_from_slice(data);
        Ok(())
    }

    async fn close(&mut self) -> StorageResult<()> {
        if !self.closed {
            self.closed = true;
            self.counters.closes.fetch_add(1, Ordering::SeqCst);
            self.counters.open_handles.fetch_sub(1, Ordering::SeqCst);
        }
        Ok(())
    }
}
