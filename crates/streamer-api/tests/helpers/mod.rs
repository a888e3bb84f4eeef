//! Test helpers: build the router over an in-memory repository and a temp-dir store.
//!
//! Run from workspace root: `cargo test -p streamer-api`.

#![allow(dead_code)]

use axum_test::TestServer;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use streamer_api::setup::routes::{setup_routes, API_PREFIX};
use streamer_api::state::{AppState, UploadLimits};
use streamer_core::IngestConfig;
use streamer_db::InMemoryFileRecordRepository;
use streamer_services::IngestService;
use streamer_storage::{upload_path, LocalFileStore};
use tempfile::TempDir;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

/// Frame size used by the test gateway, small enough to split every test file.
pub const TEST_CHUNK_SIZE: usize = 4;

pub fn api_path(path: &str) -> String {
    format!("{}{}", API_PREFIX, path)
}

pub struct TestApp {
    pub server: TestServer,
    pub repository: InMemoryFileRecordRepository,
    pub shutdown: CancellationToken,
    pub _temp_dir: TempDir,
}

impl TestApp {
    pub fn client(&self) -> &TestServer {
        &self.server
    }

    pub fn artifact_path(&self, id: Uuid) -> PathBuf {
        upload_path(self._temp_dir.path(), id)
    }
}

pub fn setup_test_app() -> TestApp {
    setup_test_app_with(InMemoryFileRecordRepository::new())
}

pub fn setup_test_app_with(repository: InMemoryFileRecordRepository) -> TestApp {
    let temp_dir = tempfile::tempdir().expect("Failed to create temp directory");
    let shutdown = CancellationToken::new();

    let ingest = IngestService::new(
        Arc::new(repository.clone()),
        Arc::new(LocalFileStore::new()),
        IngestConfig::new(temp_dir.path(), Duration::from_secs(5)),
        shutdown.clone(),
    );

    let state = Arc::new(AppState {
        ingest,
        file_repository: Arc::new(repository.clone()),
        limits: UploadLimits {
            chunk_size_bytes: TEST_CHUNK_SIZE,
            max_upload_bytes: 1024 * 1024,
        },
    });

    let server = TestServer::new(setup_routes(state)).expect("Failed to create test server");

    TestApp {
        server,
        repository,
        shutdown,
        _temp_dir: temp_dir,
    }
}
