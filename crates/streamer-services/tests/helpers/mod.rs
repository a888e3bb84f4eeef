//! Test helpers: build an ingest pipeline over an in-memory repository.
//!
//! Run from workspace root: `cargo test -p streamer-services`.

#![allow(dead_code)]

pub mod storage;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use streamer_core::IngestConfig;
use streamer_db::InMemoryFileRecordRepository;
use streamer_services::IngestService;
use streamer_storage::{upload_path, FileStore};
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

pub use storage::{FailAt, RecordingStore};

pub const UPLOAD_ROOT: &str = "/srv/uploads";

/// Pipeline under test and the collaborators it was built from.
pub struct TestPipeline {
    pub service: IngestService,
    pub repository: InMemoryFileRecordRepository,
    pub shutdown: CancellationToken,
    pub upload_root: PathBuf,
}

impl TestPipeline {
    pub fn artifact_path(&self, id: Uuid) -> PathBuf {
        upload_path(&self.upload_root, id)
    }
}

pub fn setup_pipeline(store: Arc<dyn FileStore>, inactivity_timeout: Duration) -> TestPipeline {
    setup_pipeline_with(
        store,
        InMemoryFileRecordRepository::new(),
        Path::new(UPLOAD_ROOT),
        inactivity_timeout,
    )
}

pub fn setup_pipeline_with(
    store: Arc<dyn FileStore>,
    repository: InMemoryFileRecordRepository,
    upload_root: &Path,
    inactivity_timeout: Duration,
) -> TestPipeline {
    let shutdown = CancellationToken::new();
    let service = IngestService::new(
        Arc::new(repository.clone()),
        store,
        IngestConfig::new(upload_root, inactivity_timeout),
        shutdown.clone(),
    );

    TestPipeline {
        service,
        repository,
        shutdown,
        upload_root: upload_root.to_path_buf(),
    }
}

/// Poll `condition` until it holds or `limit` elapses.
pub async fn wait_until(limit: Duration, mut condition: impl FnMut() -> bool) -> bool {
    let deadline = tokio::time::Instant::now() + limit;
    while tokio::time::Instant::now() < deadline {
        if condition() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    condition()
}
